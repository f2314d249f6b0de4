//! SerpAPI Client
//!
//! Web search through SerpAPI's DuckDuckGo engine. Used instead of the HTML
//! frontend when a SerpAPI key is configured: the JSON API is stable and not
//! subject to scraping blocks.

use super::{SearchError, WebResult, WebSearchBackend};
use async_trait::async_trait;
use serde_json::Value;
use serpapi_search_rust::serp_api_search::SerpApiSearch;
use std::collections::HashMap;
use tracing::{debug, info};

/// SerpAPI's wording when the engine had nothing for the query
const NO_RESULTS_MARKER: &str = "hasn't returned any results";

pub struct SerpApiClient {
    api_key: String,
    region: String,
}

impl SerpApiClient {
    pub fn new(api_key: String, region: &str) -> Self {
        Self {
            api_key,
            region: region.to_string(),
        }
    }

    /// Configure client from config
    pub fn from_config(config: &crate::config::SearchConfig) -> Option<Self> {
        let key = config.serpapi_key.as_ref().filter(|k| !k.trim().is_empty())?;
        Some(Self::new(key.clone(), &config.region))
    }
}

#[async_trait]
impl WebSearchBackend for SerpApiClient {
    fn name(&self) -> &'static str {
        "serpapi"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::NoApiKey);
        }

        info!(query = %query, region = %self.region, "Searching DuckDuckGo via SerpAPI");

        let mut params = HashMap::<String, String>::new();
        params.insert("engine".to_string(), "duckduckgo".to_string());
        params.insert("q".to_string(), query.to_string());
        params.insert("kl".to_string(), self.region.clone());

        let search = SerpApiSearch::google(params, self.api_key.clone());

        let results = search
            .json()
            .await
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;

        debug!("Raw SerpAPI response received");

        let web_results = parse_organic_results(&results, max_results)?;
        info!(count = web_results.len(), "SerpAPI search completed");
        Ok(web_results)
    }
}

/// Pull `organic_results` out of a SerpAPI response body
fn parse_organic_results(results: &Value, max_results: usize) -> Result<Vec<WebResult>, SearchError> {
    if let Some(message) = results.get("error").and_then(|v| v.as_str()) {
        if message.contains(NO_RESULTS_MARKER) {
            return Ok(Vec::new());
        }
        return Err(SearchError::ApiError(message.to_string()));
    }

    let Some(organic_results) = results.get("organic_results") else {
        return Ok(Vec::new());
    };

    let results_array = organic_results
        .as_array()
        .ok_or_else(|| SearchError::ParseError("Expected array of results".to_string()))?;

    let web_results = results_array
        .iter()
        .take(max_results)
        .map(|result| {
            let field = |name: &str| {
                result
                    .get(name)
                    .and_then(|v| v.as_str())
                    .unwrap_or("")
                    .to_string()
            };
            WebResult {
                title: field("title"),
                snippet: field("snippet"),
                link: field("link"),
            }
        })
        .collect();

    Ok(web_results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_organic_results() {
        let body = json!({
            "search_metadata": {"status": "Success"},
            "organic_results": [
                {"position": 1, "title": "Tokio", "snippet": "An async runtime", "link": "https://tokio.rs"},
                {"position": 2, "title": "Async Book", "link": "https://rust-lang.github.io/async-book/"},
                {"position": 3, "title": "Third", "snippet": "dropped", "link": "https://example.com"}
            ]
        });

        let results = parse_organic_results(&body, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Tokio");
        assert_eq!(results[0].link, "https://tokio.rs");
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn test_parse_no_results() {
        let body = json!({"error": "DuckDuckGo hasn't returned any results for this query."});
        assert!(parse_organic_results(&body, 3).unwrap().is_empty());
        assert!(parse_organic_results(&json!({}), 3).unwrap().is_empty());
    }

    #[test]
    fn test_parse_api_error() {
        let body = json!({"error": "Invalid API key."});
        let err = parse_organic_results(&body, 3).unwrap_err();
        assert_eq!(err.kind(), "ApiError");
    }

    #[test]
    fn test_from_config_requires_key() {
        let mut config = crate::config::SearchConfig::default();
        assert!(SerpApiClient::from_config(&config).is_none());
        config.serpapi_key = Some("abc".to_string());
        assert!(SerpApiClient::from_config(&config).is_some());
    }
}
