//! Source extractors for trending listings.
//!
//! Each submodule exposes one `extract(fetcher, request, ...)` entry point
//! that performs its own network I/O and returns an [`ExtractionResult`]. Errors never
//! escape: they are logged here and turned into a failed result.
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Fallback |
//! |--------|--------|--------|----------|
//! | InfoQ | [`infoq`] | JSON API | RSS feed when the API call errors |
//! | GitHub Trending | [`github_trending`] | HTML rows | none |
//! | QbitAI | [`qbitai`] | HTML anchors | relative-link pass when no absolute links match |
//!
//! # Common Rules
//!
//! All extractors feed candidates through an [`ItemCollector`], which trims
//! titles, drops empty titles and non-absolute URLs, de-duplicates by URL, and
//! stops at [`MAX_ITEMS`].

pub mod github_trending;
pub mod infoq;
pub mod qbitai;

use crate::error::ExtractError;
use crate::http::PageFetcher;
use crate::models::{ContentItem, ExtractionRequest, ExtractionResult, Outcome};
use clap::ValueEnum;
use std::collections::HashSet;
use tracing::{debug, error, info};
use url::Url;

/// Upper bound on items per extraction.
pub const MAX_ITEMS: usize = 25;

/// The sources this crate knows how to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    Infoq,
    Opengithub,
    Qbitai,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Infoq, SourceKind::Opengithub, SourceKind::Qbitai];

    /// Default `source_id` echoed in results.
    pub fn id(self) -> &'static str {
        match self {
            SourceKind::Infoq => "infoq",
            SourceKind::Opengithub => "opengithub",
            SourceKind::Qbitai => "qbitai",
        }
    }

    /// Default display alias.
    pub fn alias(self) -> &'static str {
        match self {
            SourceKind::Infoq => "InfoQ",
            SourceKind::Opengithub => "GitHub Trending",
            SourceKind::Qbitai => "量子位",
        }
    }

    pub fn request(self) -> ExtractionRequest {
        ExtractionRequest::new(self.id(), self.alias())
    }
}

/// Per-call policy knobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions {
    /// Also try InfoQ's RSS feed when the API answers with zero usable records.
    pub fallback_on_empty: bool,
}

/// Run the extractor for `kind`.
pub async fn extract<F: PageFetcher>(
    kind: SourceKind,
    fetcher: &F,
    request: ExtractionRequest,
    options: ExtractOptions,
) -> ExtractionResult {
    match kind {
        SourceKind::Infoq => infoq::extract(fetcher, request, options).await,
        SourceKind::Opengithub => github_trending::extract(fetcher, request).await,
        SourceKind::Qbitai => qbitai::extract(fetcher, request).await,
    }
}

/// Convert an extractor's internal outcome into the caller-facing result,
/// logging either way.
pub(crate) fn conclude(
    request: ExtractionRequest,
    outcome: Result<(Vec<ContentItem>, &'static str), ExtractError>,
) -> ExtractionResult {
    match outcome {
        Ok((items, via)) => {
            info!(
                source_id = %request.source_id,
                count = items.len(),
                via,
                "Fetched trending items"
            );
            ExtractionResult::new(request, Outcome::Success(items))
        }
        Err(e) => {
            error!(
                source_id = %request.source_id,
                kind = ?e.kind(),
                error = %e,
                "Extraction failed"
            );
            ExtractionResult::new(request, Outcome::Failure(e.to_string()))
        }
    }
}

/// Accumulates items while enforcing the shared item rules.
#[derive(Debug, Default)]
pub struct ItemCollector {
    items: Vec<ContentItem>,
    seen: HashSet<String>,
}

impl ItemCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate. Returns `true` if it was kept.
    pub fn push(&mut self, title: &str, url: &str) -> bool {
        let title = title.trim();
        let url = url.trim();
        if self.is_full() || title.is_empty() || self.seen.contains(url) {
            return false;
        }
        if Url::parse(url).is_err() {
            debug!(%url, "Skipping non-absolute URL");
            return false;
        }
        self.seen.insert(url.to_string());
        self.items.push(ContentItem::new(title, url));
        true
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= MAX_ITEMS
    }

    pub fn into_items(self) -> Vec<ContentItem> {
        self.items
    }

    /// The collected items, or `Empty(reason)` when nothing was kept.
    pub fn finish(self, reason: &'static str) -> Result<Vec<ContentItem>, ExtractError> {
        if self.items.is_empty() {
            Err(ExtractError::Empty(reason))
        } else {
            Ok(self.items)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::CannedFetcher;

    #[test]
    fn test_collector_trims_and_dedups() {
        let mut c = ItemCollector::new();
        assert!(c.push("  Foo \n", "https://example.com/1"));
        assert!(!c.push("Foo again", "https://example.com/1"));
        assert!(c.push("Bar", "https://example.com/2"));

        let items = c.finish("none").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Foo");
    }

    #[test]
    fn test_collector_rejects_empty_title_and_relative_url() {
        let mut c = ItemCollector::new();
        assert!(!c.push("   ", "https://example.com/1"));
        assert!(!c.push("Relative", "/2025/11/1.html"));
        assert!(c.is_empty());
        assert!(matches!(c.finish("nothing here"), Err(ExtractError::Empty("nothing here"))));
    }

    #[test]
    fn test_collector_caps_at_max_items() {
        let mut c = ItemCollector::new();
        for i in 0..40 {
            c.push(&format!("t{i}"), &format!("https://example.com/{i}"));
        }
        assert!(c.is_full());
        assert_eq!(c.into_items().len(), MAX_ITEMS);
    }

    #[test]
    fn test_source_kind_defaults() {
        assert_eq!(SourceKind::Opengithub.request(), ExtractionRequest::new("opengithub", "GitHub Trending"));
        assert_eq!(SourceKind::ALL.len(), 3);
    }

    #[tokio::test]
    async fn test_every_extractor_fails_when_network_times_out() {
        // unknown URLs time out
        let fetcher = CannedFetcher::new();
        for kind in SourceKind::ALL {
            let request = ExtractionRequest::new(format!("id-{}", kind.id()), "alias");
            let result = extract(kind, &fetcher, request, ExtractOptions::default()).await;
            assert!(!result.is_success());
            assert_eq!(result.source_id, format!("id-{}", kind.id()));
            assert_eq!(result.alias, "alias");
            let (payload, _, _) = result.into_contract();
            assert!(payload.is_none());
        }
    }
}
