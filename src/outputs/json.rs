//! JSON payload files.
//!
//! Successful extractions are written as `{"status":"success","items":[...]}`
//! under a directory named after the local date. Failures write nothing; the
//! previous file for that source, if any, is left in place.

use crate::models::ExtractionResult;
use chrono::Local;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write the payload of `result` to `{json_output_dir}/{date}/{source_id}.json`.
///
/// # Returns
///
/// The written path, or `None` when the result is a failure.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir, source_id = %result.source_id))]
pub async fn write_payload(
    result: &ExtractionResult,
    json_output_dir: &str,
) -> Result<Option<PathBuf>, Box<dyn Error>> {
    let Some(json) = result.payload_json() else {
        return Ok(None);
    };

    let local_date = Local::now().date_naive().to_string();
    let full_json_dir = PathBuf::from(json_output_dir).join(local_date);
    if let Err(e) = fs::create_dir_all(&full_json_dir).await {
        error!(path = %full_json_dir.display(), error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = full_json_dir.join(format!("{}.json", result.source_id));
    fs::write(&path, json).await?;
    info!(path = %path.display(), count = result.items().len(), "Wrote JSON payload");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContentItem, ExtractionRequest, Outcome};

    #[tokio::test]
    async fn test_write_success_payload() {
        let tmp = tempfile::tempdir().unwrap();
        let result = ExtractionResult::new(
            ExtractionRequest::new("qbitai", "量子位"),
            Outcome::Success(vec![ContentItem::new("Title", "https://www.qbitai.com/2025/11/1.html")]),
        );

        let path = write_payload(&result, tmp.path().to_str().unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(path.ends_with("qbitai.json"));

        let written = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["items"][0]["mobileUrl"], "https://www.qbitai.com/2025/11/1.html");
    }

    #[tokio::test]
    async fn test_failure_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let result = ExtractionResult::new(
            ExtractionRequest::new("infoq", "InfoQ"),
            Outcome::Failure("timed out".to_string()),
        );

        let written = write_payload(&result, tmp.path().to_str().unwrap()).await.unwrap();
        assert!(written.is_none());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
