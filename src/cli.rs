//! Command-line interface definitions for Trending News.
//!
//! All options can be provided via command-line flags or environment variables.

use crate::http::DEFAULT_TIMEOUT;
use crate::scrapers::SourceKind;
use clap::Parser;

/// Command-line arguments for the Trending News application.
///
/// # Examples
///
/// ```sh
/// # All sources, payloads printed to stdout
/// trending_news
///
/// # Only InfoQ and QbitAI, written to ./json/<date>/<source>.json
/// trending_news infoq qbitai -j ./json
///
/// # Also try InfoQ's RSS feed when the API answers with nothing usable
/// trending_news infoq --fallback-on-empty
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Sources to fetch (defaults to all)
    #[arg(value_enum)]
    pub sources: Vec<SourceKind>,

    /// Output directory for JSON payload files; payloads go to stdout when omitted
    #[arg(short, long, env = "TRENDING_JSON_DIR")]
    pub json_output_dir: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "TRENDING_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Fall back to InfoQ's RSS feed when the API returns no usable articles
    #[arg(long, env = "TRENDING_FALLBACK_ON_EMPTY")]
    pub fallback_on_empty: bool,
}

impl Cli {
    /// The requested sources, or every source when none were named.
    pub fn selected_sources(&self) -> Vec<SourceKind> {
        if self.sources.is_empty() {
            SourceKind::ALL.to_vec()
        } else {
            self.sources.clone()
        }
    }
}
