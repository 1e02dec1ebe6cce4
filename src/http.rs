//! Outbound HTTP for the extractors.
//!
//! Extractors never talk to `reqwest` directly. They describe a GET through a
//! [`PageRequest`] and hand it to a [`PageFetcher`], so tests can swap the
//! network for canned bodies.
//!
//! # Architecture
//!
//! - [`PageFetcher`]: async trait returning the raw response body
//! - [`HttpFetcher`]: the real implementation over a `reqwest::Client`
//! - `testing::CannedFetcher` (tests only): URL → canned body/status/timeout

use crate::error::ExtractError;
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Desktop browser identity sent with every request.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Default per-request timeout ceiling.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// A single GET: target URL plus extra headers and query parameters.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub url: &'a str,
    pub headers: &'a [(&'a str, &'a str)],
    pub query: &'a [(&'a str, &'a str)],
}

impl<'a> PageRequest<'a> {
    pub fn get(url: &'a str) -> Self {
        Self {
            url,
            headers: &[],
            query: &[],
        }
    }

    pub fn headers(mut self, headers: &'a [(&'a str, &'a str)]) -> Self {
        self.headers = headers;
        self
    }

    pub fn query(mut self, query: &'a [(&'a str, &'a str)]) -> Self {
        self.query = query;
        self
    }
}

/// Something that can perform a [`PageRequest`] and return the body bytes.
///
/// Implementations must treat any non-2xx status as an error.
pub trait PageFetcher {
    async fn fetch(&self, request: &PageRequest<'_>) -> Result<Vec<u8>, ExtractError>;
}

/// [`PageFetcher`] backed by a `reqwest::Client`.
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a client with the browser user agent and the given timeout.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }
}

impl fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(url = %request.url))]
    async fn fetch(&self, request: &PageRequest<'_>) -> Result<Vec<u8>, ExtractError> {
        let t0 = Instant::now();
        let mut builder = self.client.get(request.url);
        for (name, value) in request.headers {
            builder = builder.header(*name, *value);
        }
        if !request.query.is_empty() {
            builder = builder.query(request.query);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| transport_error(request.url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), elapsed_ms = t0.elapsed().as_millis() as u64, "Non-success status");
            return Err(ExtractError::Status {
                url: request.url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| transport_error(request.url, e))?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            preview = %truncate_for_log(&String::from_utf8_lossy(&body), 120),
            "Fetched page"
        );
        Ok(body.to_vec())
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> ExtractError {
    if e.is_timeout() {
        ExtractError::Timeout {
            url: url.to_string(),
        }
    } else {
        ExtractError::Transport {
            url: url.to_string(),
            source: e,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_builder() {
        let headers = [("Referer", "https://example.com/")];
        let query = [("size", "25")];
        let req = PageRequest::get("https://example.com/api")
            .headers(&headers)
            .query(&query);
        assert_eq!(req.url, "https://example.com/api");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.query[0], ("size", "25"));
    }

    #[test]
    fn test_http_fetcher_builds() {
        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap();
        assert!(format!("{:?}", fetcher).contains("15s"));
    }

    #[tokio::test]
    async fn test_canned_fetcher_records_requests() {
        let fetcher = testing::CannedFetcher::new()
            .body("https://a.example/", "hello")
            .with("https://b.example/", testing::Canned::Status(503));

        let ok = fetcher.fetch(&PageRequest::get("https://a.example/")).await.unwrap();
        assert_eq!(ok, b"hello");

        let err = fetcher
            .fetch(&PageRequest::get("https://b.example/"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Status { status: 503, .. }));

        let err = fetcher
            .fetch(&PageRequest::get("https://c.example/"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Timeout { .. }));

        assert_eq!(
            fetcher.requested(),
            vec!["https://a.example/", "https://b.example/", "https://c.example/"]
        );
    }
}
