//! Extraction of the fields we need from MediaWiki API replies.

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Default, Deserialize)]
struct SearchReply {
    #[serde(default)]
    query: Option<SearchQuery>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, Default, Deserialize)]
struct ExtractReply {
    #[serde(default)]
    query: Option<ExtractQuery>,
}

#[derive(Debug, Default, Deserialize)]
struct ExtractQuery {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    missing: Option<serde_json::Value>,
}

/// Title of the first search hit.
pub fn first_search_title(body: &str) -> Option<String> {
    let reply: SearchReply = serde_json::from_str(body).ok()?;
    reply
        .query?
        .search
        .into_iter()
        .map(|hit| hit.title)
        .find(|title| !title.trim().is_empty())
}

/// Plain-text intro of the single page in an extracts reply.
///
/// Missing pages are keyed `-1` and carry a `missing` marker; both are
/// treated as no result, as is an empty extract.
pub fn page_extract(body: &str) -> Option<String> {
    let reply: ExtractReply = serde_json::from_str(body).ok()?;
    reply
        .query?
        .pages
        .into_iter()
        .filter(|(id, page)| id != "-1" && page.missing.is_none())
        .filter_map(|(_, page)| page.extract)
        .map(|text| text.trim().to_string())
        .find(|text| !text.is_empty())
}
