//! DuckDuckGo HTML Client
//!
//! Keyless web search against the HTML-only DuckDuckGo frontend. Result
//! links come wrapped in a `/l/?uddg=` redirect; the real target is unwrapped
//! so observations carry a usable URL.

use super::{http_client, SearchError, WebResult, WebSearchBackend};
use async_trait::async_trait;
use reqwest::{Client, Url};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info};

pub const DUCKDUCKGO_HTML_BASE: &str = "https://html.duckduckgo.com";

pub struct DuckDuckGoClient {
    client: Client,
    base_url: String,
    region: String,
}

impl DuckDuckGoClient {
    pub fn new(region: &str, timeout: Duration) -> Result<Self, SearchError> {
        Self::with_base_url(DUCKDUCKGO_HTML_BASE, region, timeout)
    }

    pub fn with_base_url(base_url: &str, region: &str, timeout: Duration) -> Result<Self, SearchError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            region: region.to_string(),
        })
    }
}

#[async_trait]
impl WebSearchBackend for DuckDuckGoClient {
    fn name(&self) -> &'static str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>, SearchError> {
        info!(query = %query, region = %self.region, "Searching DuckDuckGo");

        let html = self
            .client
            .get(format!("{}/html/", self.base_url))
            .query(&[("q", query), ("kl", self.region.as_str())])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        debug!(bytes = html.len(), "DuckDuckGo page received");

        let results = parse_results(&html, max_results)?;
        info!(count = results.len(), "DuckDuckGo search completed");
        Ok(results)
    }
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::ParseError(format!("bad selector {}: {}", css, e)))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join("").trim().to_string()
}

/// Extract organic results (ads skipped) from a DuckDuckGo HTML page
fn parse_results(html: &str, max_results: usize) -> Result<Vec<WebResult>, SearchError> {
    let result_sel = selector("div.result")?;
    let title_sel = selector("a.result__a")?;
    let snippet_sel = selector(".result__snippet")?;

    let document = Html::parse_document(html);
    let mut results = Vec::new();

    for result in document.select(&result_sel) {
        if results.len() >= max_results {
            break;
        }
        if result.value().classes().any(|c| c == "result--ad") {
            continue;
        }

        let Some(anchor) = result.select(&title_sel).next() else {
            continue;
        };

        let title = element_text(anchor);
        let link = anchor.value().attr("href").map(resolve_link).unwrap_or_default();
        let snippet = result
            .select(&snippet_sel)
            .next()
            .map(element_text)
            .unwrap_or_default();

        results.push(WebResult { title, snippet, link });
    }

    Ok(results)
}

/// Unwrap DuckDuckGo's `//duckduckgo.com/l/?uddg=<target>` redirect links
fn resolve_link(href: &str) -> String {
    let absolute = if href.starts_with("//") {
        format!("https:{}", href)
    } else {
        href.to_string()
    };

    Url::parse(&absolute)
        .ok()
        .and_then(|url| {
            url.query_pairs()
                .find(|(key, _)| key == "uddg")
                .map(|(_, target)| target.into_owned())
        })
        .unwrap_or(absolute)
}
