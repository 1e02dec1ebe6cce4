//! Data models shared by every extractor.
//!
//! - [`ExtractionRequest`]: the opaque `(source_id, alias)` pair a caller passes in
//! - [`ContentItem`]: one normalized `{title, url, mobileUrl}` entry
//! - [`ExtractionResult`]: the request echoed back with either items or a failure reason
//! - [`SuccessPayload`]: the serialized JSON shape handed to callers on success
//!
//! Nothing here is persisted; every value lives for one extraction call.

use serde::{Deserialize, Serialize};

/// Identifiers for one extraction call. Never interpreted, only echoed back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub source_id: String,
    pub alias: String,
}

impl ExtractionRequest {
    pub fn new(source_id: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            alias: alias.into(),
        }
    }
}

/// A single normalized trending entry.
///
/// The `mobileUrl` field name is fixed by the downstream JSON contract.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContentItem {
    /// Trimmed, never empty.
    pub title: String,
    /// Absolute URL; the dedup key.
    pub url: String,
    /// Absolute URL for mobile clients. Equal to `url` for every current source.
    #[serde(rename = "mobileUrl")]
    pub mobile_url: String,
}

impl ContentItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            title: title.into(),
            mobile_url: url.clone(),
            url,
        }
    }
}

/// What an extraction produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// At least one item. An empty list is never wrapped in `Success`.
    Success(Vec<ContentItem>),
    /// Human-readable reason, already logged.
    Failure(String),
}

/// An [`Outcome`] together with the echoed request identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub source_id: String,
    pub alias: String,
    pub outcome: Outcome,
}

/// The JSON payload returned to callers on success:
/// `{"status": "success", "items": [...]}`.
#[derive(Debug, Deserialize, Serialize)]
pub struct SuccessPayload {
    pub status: String,
    pub items: Vec<ContentItem>,
}

impl ExtractionResult {
    /// Build a result, downgrading an empty item list to a failure.
    pub fn new(request: ExtractionRequest, outcome: Outcome) -> Self {
        let outcome = match outcome {
            Outcome::Success(items) if items.is_empty() => {
                Outcome::Failure("no valid items found".to_string())
            }
            other => other,
        };
        Self {
            source_id: request.source_id,
            alias: request.alias,
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success(_))
    }

    pub fn items(&self) -> &[ContentItem] {
        match &self.outcome {
            Outcome::Success(items) => items,
            Outcome::Failure(_) => &[],
        }
    }

    /// Serialize the success payload, or `None` on failure.
    pub fn payload_json(&self) -> Option<String> {
        match &self.outcome {
            Outcome::Success(items) => {
                let payload = SuccessPayload {
                    status: "success".to_string(),
                    items: items.clone(),
                };
                serde_json::to_string(&payload).ok()
            }
            Outcome::Failure(_) => None,
        }
    }

    /// The caller-facing triple `(payload, source_id, alias)`.
    pub fn into_contract(self) -> (Option<String>, String, String) {
        let payload = self.payload_json();
        (payload, self.source_id, self.alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ExtractionRequest {
        ExtractionRequest::new("infoq", "InfoQ")
    }

    #[test]
    fn test_content_item_mobile_url_defaults_to_url() {
        let item = ContentItem::new("Foo", "https://www.infoq.cn/article/123");
        assert_eq!(item.mobile_url, item.url);
    }

    #[test]
    fn test_content_item_serializes_mobile_url_camel_case() {
        let item = ContentItem::new("Foo", "https://example.com/a");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(
            json,
            r#"{"title":"Foo","url":"https://example.com/a","mobileUrl":"https://example.com/a"}"#
        );
    }

    #[test]
    fn test_empty_success_becomes_failure() {
        let result = ExtractionResult::new(request(), Outcome::Success(vec![]));
        assert!(!result.is_success());
        assert_eq!(result.payload_json(), None);
    }

    #[test]
    fn test_success_contract_payload() {
        let result = ExtractionResult::new(
            request(),
            Outcome::Success(vec![ContentItem::new("量子位", "https://example.com/a")]),
        );
        let (payload, id, alias) = result.into_contract();
        assert_eq!(id, "infoq");
        assert_eq!(alias, "InfoQ");

        let payload = payload.unwrap();
        // non-ASCII stays verbatim
        assert!(payload.contains("量子位"));
        let parsed: SuccessPayload = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed.status, "success");
        assert_eq!(parsed.items.len(), 1);
    }

    #[test]
    fn test_failure_contract_echoes_ids() {
        let result = ExtractionResult::new(request(), Outcome::Failure("timeout".to_string()));
        let (payload, id, alias) = result.into_contract();
        assert!(payload.is_none());
        assert_eq!((id.as_str(), alias.as_str()), ("infoq", "InfoQ"));
    }
}
