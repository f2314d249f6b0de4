//! arXiv Client
//!
//! Queries the arXiv export API, which answers with an Atom feed.

use super::{http_client, SearchError};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

pub const ARXIV_API_BASE: &str = "https://export.arxiv.org";

/// Errors are reported as a feed entry whose id points here
const ERROR_ENTRY_PREFIX: &str = "http://arxiv.org/api/errors";

/// A single preprint
#[derive(Debug, Clone, PartialEq)]
pub struct Paper {
    pub title: String,
    /// Stable abstract-page URL, e.g. `http://arxiv.org/abs/1706.03762v7`
    pub entry_id: String,
    pub summary: String,
}

pub struct ArxivClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct Feed {
    #[serde(rename = "entry", default)]
    entries: Vec<Entry>,
}

#[derive(Deserialize)]
struct Entry {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
}

impl ArxivClient {
    pub fn new(timeout: Duration) -> Result<Self, SearchError> {
        Self::with_base_url(ARXIV_API_BASE, timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, SearchError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Most relevant papers for `query`, best first
    pub async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Paper>, SearchError> {
        info!(query = %query, max_results, "Searching arXiv");

        let max_results = max_results.to_string();
        let body = self
            .client
            .get(format!("{}/api/query", self.base_url))
            .query(&[
                ("search_query", query),
                ("start", "0"),
                ("max_results", max_results.as_str()),
                ("sortBy", "relevance"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let papers = parse_feed(&body)?;
        info!(count = papers.len(), "arXiv search completed");
        Ok(papers)
    }
}

fn parse_feed(xml: &str) -> Result<Vec<Paper>, SearchError> {
    let feed: Feed = quick_xml::de::from_str(xml).map_err(|e| SearchError::ParseError(e.to_string()))?;

    feed.entries
        .into_iter()
        .map(|entry| {
            if entry.id.starts_with(ERROR_ENTRY_PREFIX) {
                return Err(SearchError::ApiError(entry.summary.trim().to_string()));
            }
            Ok(Paper {
                title: entry.title.trim().to_string(),
                entry_id: entry.id.trim().to_string(),
                summary: entry.summary,
            })
        })
        .collect()
}
