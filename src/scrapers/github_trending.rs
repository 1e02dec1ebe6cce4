//! GitHub Trending extractor.
//!
//! There is no documented API for the trending page, so the HTML is parsed
//! directly. Each listed repository lives in an `article.Box-row`; its
//! `owner/name` comes from the heading link and its description from the
//! muted paragraph under it.

use super::{ItemCollector, MAX_ITEMS, conclude};
use crate::error::ExtractError;
use crate::http::{PageFetcher, PageRequest};
use crate::models::{ContentItem, ExtractionRequest, ExtractionResult};
use crate::utils::{collapse_whitespace, truncate_chars};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

pub const TRENDING_URL: &str = "https://github.com/trending";
const ORIGIN: &str = "https://github.com";

/// Longest description kept before truncation.
const DESCRIPTION_LIMIT: usize = 150;

/// Site sections that look like `/owner/name` but are not repositories.
const DENYLIST: [&str; 5] = ["/trending", "/features", "/solutions", "/resources", "/sponsors"];

const HEADERS: [(&str, &str); 1] = [(
    "Accept",
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
)];

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("article.Box-row").expect("row selector"));
static HEADING_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2.lh-condensed a[href]").expect("heading link selector"));
static DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.col-9.color-fg-muted").expect("description selector"));

/// Fetch the trending page and turn each repository row into an item.
#[instrument(level = "info", skip(fetcher), fields(source_id = %request.source_id))]
pub async fn extract<F: PageFetcher>(fetcher: &F, request: ExtractionRequest) -> ExtractionResult {
    let outcome = fetch_items(fetcher).await.map(|items| (items, "html"));
    conclude(request, outcome)
}

async fn fetch_items<F: PageFetcher>(fetcher: &F) -> Result<Vec<ContentItem>, ExtractError> {
    let body = fetcher
        .fetch(&PageRequest::get(TRENDING_URL).headers(&HEADERS))
        .await?;
    let html = String::from_utf8_lossy(&body);
    parse_trending(&html).finish("no valid items found")
}

fn parse_trending(html: &str) -> ItemCollector {
    let document = Html::parse_document(html);
    let mut collector = ItemCollector::new();

    for row in document.select(&ROW).take(MAX_ITEMS) {
        let Some((owner, name)) = row
            .select(&HEADING_LINK)
            .filter_map(|a| a.value().attr("href"))
            .find_map(repo_path)
        else {
            debug!("Skipping row without a repository link");
            continue;
        };
        if is_denylisted(owner) {
            debug!(%owner, %name, "Skipping non-repository section");
            continue;
        }

        let repo_name = format!("{owner}/{name}");
        let url = format!("{ORIGIN}/{repo_name}");
        let title = match description(row) {
            Some(desc) => format!("{repo_name} - {desc}"),
            None => repo_name,
        };
        collector.push(&title, &url);
    }
    collector
}

/// Split an href shaped like `/owner/name` into its two segments.
fn repo_path(href: &str) -> Option<(&str, &str)> {
    let path = href.trim().strip_prefix('/')?;
    let (owner, name) = path.split_once('/')?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return None;
    }
    Some((owner, name))
}

/// Whether `/{owner}/...` falls under a site section rather than a repository.
fn is_denylisted(owner: &str) -> bool {
    DENYLIST
        .iter()
        .any(|section| format!("/{owner}/").starts_with(section))
}

/// Plain-text description with markup dropped, whitespace collapsed and
/// length capped. `None` when absent or blank.
fn description(row: ElementRef<'_>) -> Option<String> {
    let p = row.select(&DESCRIPTION).next()?;
    let text = collapse_whitespace(&p.text().collect::<String>());
    if text.is_empty() {
        return None;
    }
    Some(truncate_chars(&text, DESCRIPTION_LIMIT))
}
