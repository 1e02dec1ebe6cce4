//! # Trending News
//!
//! Fetches trending listings from a handful of third-party sources and
//! normalizes each into a uniform list of `{title, url, mobileUrl}` items.
//!
//! ## Sources
//!
//! - InfoQ hot articles (JSON API, RSS feed fallback)
//! - GitHub Trending (HTML)
//! - QbitAI latest articles (HTML)
//!
//! ## Usage
//!
//! ```sh
//! trending_news -j ./json
//! ```
//!
//! ## Architecture
//!
//! Every source is an independent extractor. This binary runs the selected
//! extractors one after another, then either prints each success payload
//! on its own stdout line or writes it under the JSON output directory.
//! A failed source is logged and skipped; it never aborts the run.

use clap::Parser;
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod error;
mod http;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use http::HttpFetcher;
use models::ExtractionResult;
use outputs::json;
use scrapers::{ExtractOptions, SourceKind};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("trending_news starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    if let Some(dir) = args.json_output_dir.as_deref() {
        ensure_writable_dir(dir).await?;
    }

    let fetcher = HttpFetcher::new(Duration::from_secs(args.timeout_secs))?;
    let options = ExtractOptions {
        fallback_on_empty: args.fallback_on_empty,
    };

    let sources = args.selected_sources();
    let total = sources.len();
    let fetcher = &fetcher;
    let json_output_dir = args.json_output_dir.as_deref();

    let succeeded: usize = stream::iter(sources)
        .then(|kind: SourceKind| async move {
            let result = scrapers::extract(kind, fetcher, kind.request(), options).await;
            if !result.is_success() {
                return 0;
            }
            deliver(&result, json_output_dir).await
        })
        .fold(0, |acc, n| async move { acc + n })
        .await;

    let elapsed = start_time.elapsed();
    info!(
        total,
        succeeded,
        failed = total - succeeded,
        millis = elapsed.as_millis() as u64,
        "Execution complete"
    );
    Ok(())
}

/// Write or print a successful result. Returns 1 when it was delivered, 0 otherwise.
async fn deliver(result: &ExtractionResult, json_output_dir: Option<&str>) -> usize {
    match json_output_dir {
        Some(dir) => match json::write_payload(result, dir).await {
            Ok(Some(_)) => 1,
            Ok(None) => 0,
            Err(e) => {
                warn!(source_id = %result.source_id, error = %e, "Failed to write JSON payload");
                0
            }
        },
        None => match result.payload_json() {
            Some(payload) => {
                println!("{payload}");
                1
            }
            None => 0,
        },
    }
}
