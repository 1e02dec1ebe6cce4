//! Error taxonomy for source extraction.
//!
//! Every fallible step inside an extractor returns [`ExtractError`]. The
//! public extractor entry points never surface it to callers: it is logged
//! and folded into a failed [`ExtractionResult`](crate::models::ExtractionResult).

use thiserror::Error;

/// Coarse classification of an [`ExtractError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection failure, timeout or non-2xx status.
    Transport,
    /// The body was not the JSON/XML/HTML shape we expected.
    Decode,
    /// Parsing worked but nothing qualified as an item.
    Empty,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("{0}")]
    Empty(&'static str),
}

impl ExtractError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExtractError::Transport { .. }
            | ExtractError::Status { .. }
            | ExtractError::Timeout { .. } => ErrorKind::Transport,
            ExtractError::Json(_) | ExtractError::Xml(_) | ExtractError::Malformed(_) => {
                ErrorKind::Decode
            }
            ExtractError::Empty(_) => ErrorKind::Empty,
        }
    }
}
