//! Wikipedia Client
//!
//! Two-step lookup against the MediaWiki action API: a full-text search picks
//! the best matching title, then the intro extract of that page is fetched.
//! Disambiguation pages are reported with their first few candidates, read
//! from the page's list items in the order the page lists them.

use super::{http_client, SearchError};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Outcome of an encyclopedia lookup
#[derive(Debug, Clone, PartialEq)]
pub enum WikiLookup {
    Page { title: String, summary: String },
    Disambiguation { title: String, options: Vec<String> },
    NotFound,
}

pub struct WikipediaClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    code: String,
    info: String,
}

#[derive(Deserialize)]
struct SearchQuery {
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: Vec<PageInfo>,
}

#[derive(Deserialize)]
struct PageInfo {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    pageprops: Option<PageProps>,
}

#[derive(Deserialize)]
struct PageProps {
    disambiguation: Option<String>,
}

#[derive(Deserialize)]
struct ParsedPage {
    #[serde(default)]
    text: String,
}

impl WikipediaClient {
    /// Client for the `language` edition, e.g. `en`
    pub fn new(language: &str, timeout: Duration) -> Result<Self, SearchError> {
        Self::with_base_url(&format!("https://{}.wikipedia.org", language), timeout)
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, SearchError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search for `query` and summarise the best match in `sentences` sentences
    pub async fn lookup(&self, query: &str, sentences: u32) -> Result<WikiLookup, SearchError> {
        match self.search_title(query).await? {
            Some(title) => self.summary(&title, sentences).await,
            None => Ok(WikiLookup::NotFound),
        }
    }

    /// Best matching page title for `query`
    pub async fn search_title(&self, query: &str) -> Result<Option<String>, SearchError> {
        info!(query = %query, "Searching Wikipedia");

        let query: SearchQuery = self
            .api("query", &[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("srlimit", "1"),
                ("srprop", ""),
            ])
            .await?;

        Ok(query.search.into_iter().next().map(|hit| hit.title))
    }

    /// Intro summary of `title`, or its candidates if it is a disambiguation page
    pub async fn summary(&self, title: &str, sentences: u32) -> Result<WikiLookup, SearchError> {
        let sentences = sentences.max(1).to_string();
        let query: PagesQuery = self
            .api("query", &[
                ("action", "query"),
                ("prop", "extracts|pageprops"),
                ("ppprop", "disambiguation"),
                ("explaintext", "1"),
                ("exintro", "1"),
                ("exsentences", sentences.as_str()),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;

        let page = query
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::ParseError("response contained no pages".to_string()))?;

        if page.missing {
            return Err(SearchError::PageNotFound(page.title));
        }

        let is_disambiguation = page
            .pageprops
            .as_ref()
            .is_some_and(|props| props.disambiguation.is_some());
        if is_disambiguation {
            let options = self.disambiguation_options(&page.title, 3).await?;
            return Ok(WikiLookup::Disambiguation {
                title: page.title,
                options,
            });
        }

        debug!(title = %page.title, "Wikipedia summary received");
        Ok(WikiLookup::Page {
            title: page.title,
            summary: page.extract.unwrap_or_default().trim().to_string(),
        })
    }

    async fn disambiguation_options(&self, title: &str, limit: usize) -> Result<Vec<String>, SearchError> {
        let page: ParsedPage = self
            .api("parse", &[
                ("action", "parse"),
                ("page", title),
                ("prop", "text"),
                ("redirects", "1"),
            ])
            .await?;

        list_item_links(&page.text, limit)
    }

    /// Call the action API and deserialize one top-level section of the reply
    async fn api<T: DeserializeOwned>(&self, section: &str, params: &[(&str, &str)]) -> Result<T, SearchError> {
        let mut body: Value = self
            .client
            .get(format!("{}/w/api.php", self.base_url))
            .query(params)
            .query(&[("format", "json"), ("formatversion", "2")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = body.get_mut("error").map(Value::take) {
            let error: ApiErrorBody =
                serde_json::from_value(error).map_err(|e| SearchError::ParseError(e.to_string()))?;
            return Err(SearchError::ApiError(format!("{}: {}", error.code, error.info)));
        }

        let section_body = body
            .get_mut(section)
            .map(Value::take)
            .ok_or_else(|| SearchError::ParseError(format!("response missing '{}'", section)))?;
        serde_json::from_value(section_body).map_err(|e| SearchError::ParseError(e.to_string()))
    }
}

/// Text of the first link in each list item, skipping table-of-contents entries
fn list_item_links(html: &str, limit: usize) -> Result<Vec<String>, SearchError> {
    let item_sel = Selector::parse("li").map_err(|e| SearchError::ParseError(e.to_string()))?;
    let link_sel = Selector::parse("a").map_err(|e| SearchError::ParseError(e.to_string()))?;

    let document = Html::parse_fragment(html);
    let options = document
        .select(&item_sel)
        .filter(|item| !item.value().classes().any(|c| c.contains("tocsection")))
        .filter_map(|item| item.select(&link_sel).next())
        .map(|link| link.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .take(limit)
        .collect();

    Ok(options)
}
