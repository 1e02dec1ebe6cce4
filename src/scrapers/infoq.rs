//! InfoQ hot-article extractor.
//!
//! The site itself answers 451 to plain page requests, so the listing comes
//! from its public JSON API, with the RSS feed as a fallback.
//!
//! # Fallback Policy
//!
//! The RSS feed is only tried when the API path *errors* (transport, status,
//! or decode). An API answer that parses but contains no usable records is a
//! failure on its own unless [`ExtractOptions::fallback_on_empty`] is set.
//! When both paths fail, the reported error is the API's.

use super::{ExtractOptions, ItemCollector, MAX_ITEMS, conclude};
use crate::error::ExtractError;
use crate::http::{PageFetcher, PageRequest};
use crate::models::{ContentItem, ExtractionRequest, ExtractionResult};
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

pub const API_URL: &str = "https://www.infoq.cn/public/v1/article/getList";
pub const RSS_URL: &str = "https://www.infoq.cn/feed";
const ARTICLE_URL_PREFIX: &str = "https://www.infoq.cn/article/";

const HEADERS: [(&str, &str); 1] = [("Referer", "https://www.infoq.cn/")];
// type=1 selects the hot-articles listing
const API_QUERY: [(&str, &str); 2] = [("size", "25"), ("type", "1")];

/// Field layouts seen in API records, tried in this order.
///
/// Title and id are resolved independently: each takes the first schema
/// that yields a usable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordSchema {
    Article,
    Plain,
}

impl RecordSchema {
    const ORDER: [RecordSchema; 2] = [RecordSchema::Article, RecordSchema::Plain];

    fn title_key(self) -> &'static str {
        match self {
            RecordSchema::Article => "article_title",
            RecordSchema::Plain => "title",
        }
    }

    fn id_key(self) -> &'static str {
        match self {
            RecordSchema::Article => "article_id",
            RecordSchema::Plain => "id",
        }
    }
}

/// Whether a JSON value counts as present for field lookup: `null`, `false`,
/// zero, and empty strings, lists or objects do not.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// The first present title across schemas. A present title that is not a
/// string is a malformed record.
fn record_title(record: &Map<String, Value>) -> Result<Option<&str>, ExtractError> {
    let Some(value) = RecordSchema::ORDER
        .iter()
        .find_map(|schema| record.get(schema.title_key()).filter(|v| is_present(v)))
    else {
        return Ok(None);
    };
    value
        .as_str()
        .map(Some)
        .ok_or_else(|| ExtractError::Malformed(format!("API record title is not a string: {value}")))
}

fn record_id(record: &Map<String, Value>) -> Option<String> {
    RecordSchema::ORDER
        .iter()
        .find_map(|schema| match record.get(schema.id_key())? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            _ => None,
        })
}

/// Fetch InfoQ hot articles, falling back to RSS per the module policy.
#[instrument(level = "info", skip(fetcher), fields(source_id = %request.source_id))]
pub async fn extract<F: PageFetcher>(
    fetcher: &F,
    request: ExtractionRequest,
    options: ExtractOptions,
) -> ExtractionResult {
    let outcome = match from_api(fetcher).await {
        Ok(items) if !items.is_empty() => Ok((items, "api")),
        Ok(_) if !options.fallback_on_empty => {
            Err(ExtractError::Empty("API returned no usable articles"))
        }
        Ok(_) => {
            let primary = ExtractError::Empty("API returned no usable articles");
            with_rss_fallback(fetcher, primary).await
        }
        Err(e) => with_rss_fallback(fetcher, e).await,
    };
    conclude(request, outcome)
}

async fn with_rss_fallback<F: PageFetcher>(
    fetcher: &F,
    primary: ExtractError,
) -> Result<(Vec<ContentItem>, &'static str), ExtractError> {
    warn!(error = %primary, "API path failed; trying RSS feed");
    match from_rss(fetcher).await {
        Ok(items) if !items.is_empty() => Ok((items, "rss")),
        Ok(_) => {
            debug!("RSS feed had no usable items");
            Err(primary)
        }
        Err(e) => {
            debug!(error = %e, "RSS fallback failed");
            Err(primary)
        }
    }
}

async fn from_api<F: PageFetcher>(fetcher: &F) -> Result<Vec<ContentItem>, ExtractError> {
    let request = PageRequest::get(API_URL).headers(&HEADERS).query(&API_QUERY);
    let body = fetcher.fetch(&request).await?;
    parse_api_body(&body)
}

async fn from_rss<F: PageFetcher>(fetcher: &F) -> Result<Vec<ContentItem>, ExtractError> {
    let request = PageRequest::get(RSS_URL).headers(&HEADERS);
    let body = fetcher.fetch(&request).await?;
    parse_rss(&body)
}

/// Parse the API body into items. An empty `Ok` means "valid but nothing usable".
fn parse_api_body(body: &[u8]) -> Result<Vec<ContentItem>, ExtractError> {
    let value: Value = serde_json::from_slice(body)?;
    let root = value
        .as_object()
        .ok_or_else(|| ExtractError::Malformed("API response is not a JSON object".to_string()))?;

    let records = match root.get("data") {
        None => return Ok(Vec::new()),
        Some(Value::Array(records)) => records,
        Some(other) => {
            return Err(ExtractError::Malformed(format!(
                "API `data` field is not a list: {other}"
            )));
        }
    };

    let mut collector = ItemCollector::new();
    for record in records.iter().take(MAX_ITEMS) {
        let Some(record) = record.as_object() else {
            continue;
        };
        match (record_title(record), record_id(record)) {
            (Ok(Some(title)), Some(id)) => {
                collector.push(title, &format!("{ARTICLE_URL_PREFIX}{id}"));
            }
            // a bad title only matters on a record that would otherwise be used
            (Err(e), Some(_)) => return Err(e),
            _ => debug!("Skipping API record without title or id"),
        }
    }
    Ok(collector.into_items())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Link,
}

#[derive(Debug)]
struct RssEntry {
    depth: usize,
    title: Option<String>,
    link: Option<String>,
}

impl RssEntry {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Title => &mut self.title,
            Field::Link => &mut self.link,
        }
    }

    /// Start capturing `name` if it is the first `title`/`link` child.
    fn open(&mut self, name: &[u8]) -> Option<Field> {
        let field = match name {
            b"title" => Field::Title,
            b"link" => Field::Link,
            _ => return None,
        };
        let slot = self.slot(field);
        if slot.is_some() {
            return None;
        }
        *slot = Some(String::new());
        Some(field)
    }
}

fn utf8(bytes: &[u8]) -> Result<&str, ExtractError> {
    std::str::from_utf8(bytes).map_err(|e| ExtractError::Malformed(format!("feed is not UTF-8: {e}")))
}

fn resolve_reference(name: &str) -> Result<String, ExtractError> {
    let resolved = match name.strip_prefix('#') {
        Some(code) => {
            let value = match code.strip_prefix('x').or_else(|| code.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => code.parse::<u32>().ok(),
            };
            value.and_then(char::from_u32).map(String::from)
        }
        None => resolve_predefined_entity(name).map(str::to_string),
    };
    resolved.ok_or_else(|| ExtractError::Malformed(format!("undefined entity &{name};")))
}

/// Parse an RSS document, reading the direct `title`/`link` children of the
/// first [`MAX_ITEMS`] `item` elements. The whole document must be well formed.
fn parse_rss(body: &[u8]) -> Result<Vec<ContentItem>, ExtractError> {
    let mut reader = Reader::from_reader(body);
    let mut buf = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;
    let mut current: Option<RssEntry> = None;
    let mut field: Option<Field> = None;
    let mut entries: Vec<RssEntry> = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                saw_root = true;
                let name = e.name();
                if let Some(entry) = current.as_mut() {
                    if depth == entry.depth + 1 {
                        field = entry.open(name.as_ref());
                    }
                } else if name.as_ref() == b"item" {
                    current = Some(RssEntry {
                        depth,
                        title: None,
                        link: None,
                    });
                }
            }
            Event::Empty(e) => {
                saw_root = true;
                if let Some(entry) = current.as_mut() {
                    if depth == entry.depth {
                        entry.open(e.name().as_ref());
                    }
                }
            }
            Event::Text(t) => append(&mut current, field, depth, utf8(&t)?),
            Event::CData(t) => append(&mut current, field, depth, utf8(&t)?),
            Event::GeneralRef(r) => {
                let text = resolve_reference(utf8(&r)?)?;
                append(&mut current, field, depth, &text);
            }
            Event::End(_) => {
                match current.as_ref().map(|entry| entry.depth) {
                    Some(item_depth) if depth == item_depth + 1 => field = None,
                    Some(item_depth) if depth == item_depth => {
                        if let Some(done) = current.take() {
                            if entries.len() < MAX_ITEMS {
                                entries.push(done);
                            }
                        }
                    }
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(ExtractError::Malformed("feed has no root element".to_string()));
    }
    if depth != 0 {
        return Err(ExtractError::Malformed("feed ends inside an open element".to_string()));
    }

    let mut collector = ItemCollector::new();
    for entry in entries {
        if let (Some(title), Some(link)) = (entry.title, entry.link) {
            collector.push(&title, &link);
        }
    }
    Ok(collector.into_items())
}

fn append(current: &mut Option<RssEntry>, field: Option<Field>, depth: usize, text: &str) {
    if let (Some(entry), Some(field)) = (current.as_mut(), field) {
        // only text directly inside the captured child
        if depth == entry.depth + 1 {
            if let Some(slot) = entry.slot(field).as_mut() {
                slot.push_str(text);
            }
        }
    }
}
