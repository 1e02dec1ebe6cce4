//! QbitAI (量子位) latest-articles extractor.
//!
//! Article links on the homepage have the shape
//! `https://www.qbitai.com/2025/11/12345.html`. Some page variants emit them
//! site-relative (`/2025/11/12345.html`), so a second, looser pass runs when
//! the absolute pass finds nothing.

use super::{ItemCollector, MAX_ITEMS, conclude};
use crate::error::ExtractError;
use crate::http::{PageFetcher, PageRequest};
use crate::models::{ContentItem, ExtractionRequest, ExtractionResult};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

pub const HOME_URL: &str = "https://www.qbitai.com/";
const ORIGIN: &str = "https://www.qbitai.com";

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").expect("anchor selector"));
static ABSOLUTE_ARTICLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https://www\.qbitai\.com/\d{4}/\d{2}/\d+\.html$").expect("absolute article regex")
});
static RELATIVE_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^/\d{4}/\d{2}/\d+\.html$").expect("relative article regex"));

/// Fetch the homepage and extract article links.
#[instrument(level = "info", skip(fetcher), fields(source_id = %request.source_id))]
pub async fn extract<F: PageFetcher>(fetcher: &F, request: ExtractionRequest) -> ExtractionResult {
    conclude(request, fetch_items(fetcher).await)
}

async fn fetch_items<F: PageFetcher>(
    fetcher: &F,
) -> Result<(Vec<ContentItem>, &'static str), ExtractError> {
    let body = fetcher.fetch(&PageRequest::get(HOME_URL)).await?;
    let html = String::from_utf8_lossy(&body);
    parse_home(&html)
}

fn parse_home(html: &str) -> Result<(Vec<ContentItem>, &'static str), ExtractError> {
    let document = Html::parse_document(html);

    let strict = collect_pass(&document, &ABSOLUTE_ARTICLE, str::to_string);
    if !strict.is_empty() {
        return Ok((strict.into_items(), "absolute"));
    }

    debug!("No absolute article links; trying site-relative links");
    let loose = collect_pass(&document, &RELATIVE_ARTICLE, |path| format!("{ORIGIN}{path}"));
    loose.finish("no valid articles found").map(|items| (items, "relative"))
}

/// Collect the first [`MAX_ITEMS`] anchors whose `href` matches `pattern`
/// and whose content is plain text.
fn collect_pass(document: &Html, pattern: &Regex, to_url: impl Fn(&str) -> String) -> ItemCollector {
    let mut collector = ItemCollector::new();
    let matches = document
        .select(&ANCHOR)
        .filter_map(|a| {
            let href = a.value().attr("href")?;
            if !pattern.is_match(href) {
                return None;
            }
            plain_text(a).map(|title| (href, title))
        })
        .take(MAX_ITEMS);

    for (href, title) in matches {
        collector.push(&title, &to_url(href));
    }
    collector
}

/// The anchor's text when it has no child elements and is not empty.
fn plain_text(anchor: ElementRef<'_>) -> Option<String> {
    if !anchor.children().all(|child| child.value().is_text()) {
        return None;
    }
    let text: String = anchor.text().collect();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{Canned, CannedFetcher};
    use crate::models::Outcome;

    fn request() -> ExtractionRequest {
        ExtractionRequest::new("qbitai", "量子位")
    }

    #[tokio::test]
    async fn test_absolute_link() {
        let html = r#"<div><a class="t" href="https://www.qbitai.com/2025/11/12345.html">Breaking News</a></div>"#;
        let fetcher = CannedFetcher::new().body(HOME_URL, html);
        let result = extract(&fetcher, request()).await;

        assert_eq!(
            result.outcome,
            Outcome::Success(vec![ContentItem::new(
                "Breaking News",
                "https://www.qbitai.com/2025/11/12345.html"
            )])
        );
    }

    #[test]
    fn test_relative_links_used_only_when_no_absolute() {
        let html = r#"
            <a href="/2025/10/1.html"> 相对链接 </a>
            <a href="/2025/10/2.html">Second</a>
            <a href="/about.html">About</a>"#;
        let (items, via) = parse_home(html).unwrap();
        assert_eq!(via, "relative");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "相对链接");
        assert_eq!(items[0].url, "https://www.qbitai.com/2025/10/1.html");

        let mixed = format!(
            r#"{html}<a href="https://www.qbitai.com/2025/11/3.html">Absolute</a>"#
        );
        let (items, via) = parse_home(&mixed).unwrap();
        assert_eq!(via, "absolute");
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_skips_blank_nested_and_duplicate() {
        let html = r#"
            <a href="https://www.qbitai.com/2025/11/1.html"><img src="x.png"></a>
            <a href="https://www.qbitai.com/2025/11/1.html">   </a>
            <a href="https://www.qbitai.com/2025/11/1.html"><span>Nested</span></a>
            <a href="https://www.qbitai.com/2025/11/1.html">Kept</a>
            <a href="https://www.qbitai.com/2025/11/1.html">Duplicate</a>
            <a href="https://www.qbitai.com/2025/1/2.html">Bad month</a>
            <a href="https://www.qbitai.com/2025/11/3.html?x=1">Query</a>"#;
        let (items, _) = parse_home(html).unwrap();
        assert_eq!(items, vec![ContentItem::new("Kept", "https://www.qbitai.com/2025/11/1.html")]);
    }

    #[test]
    fn test_caps_at_max_items() {
        let html: String = (0..40)
            .map(|i| format!(r#"<a href="https://www.qbitai.com/2025/11/{i}.html">Post {i}</a>"#))
            .collect();
        let (items, _) = parse_home(&html).unwrap();
        assert_eq!(items.len(), MAX_ITEMS);
    }

    #[test]
    fn test_no_articles_is_empty_error() {
        let err = parse_home("<html><body><a href=\"/tag/ai\">AI</a></body></html>").unwrap_err();
        assert!(matches!(err, ExtractError::Empty(_)));
    }

    #[tokio::test]
    async fn test_timeout_fails_and_echoes_request() {
        let fetcher = CannedFetcher::new().with(HOME_URL, Canned::Timeout);
        let (payload, id, alias) = extract(&fetcher, request()).await.into_contract();
        assert!(payload.is_none());
        assert_eq!(id, "qbitai");
        assert_eq!(alias, "量子位");
    }
}
