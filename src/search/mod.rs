//! Search Module
//!
//! Typed clients for the external lookup providers the agent's tools sit on:
//! - DuckDuckGo HTML (keyless web search, default)
//! - SerpAPI DuckDuckGo engine (web search when a SerpAPI key is configured)
//! - Wikipedia MediaWiki API (encyclopedia lookups)
//! - arXiv Atom API (academic preprints)
//!
//! Clients return typed results or a [`SearchError`]. Turning those into
//! prompt-ready observation text is the job of `crate::tools`.

pub mod arxiv;
pub mod duckduckgo;
pub mod serpapi;
pub mod wikipedia;

pub use arxiv::{ArxivClient, Paper};
pub use duckduckgo::DuckDuckGoClient;
pub use serpapi::SerpApiClient;
pub use wikipedia::{WikiLookup, WikipediaClient};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!(
    "oxidized-react/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/your-username/oxidized-react)"
);

/// Errors that can occur during search operations
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("SerpAPI key not configured")]
    NoApiKey,

    #[error("connection failed: {0}")]
    ConnectionError(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("provider returned HTTP {0}")]
    HttpStatus(u16),

    #[error("failed to parse search results: {0}")]
    ParseError(String),

    #[error("search request failed: {0}")]
    RequestFailed(String),

    #[error("page not found: {0}")]
    PageNotFound(String),

    #[error("provider error: {0}")]
    ApiError(String),
}

impl SearchError {
    /// Short name of the failure, used in observation text
    pub fn kind(&self) -> &'static str {
        match self {
            SearchError::NoApiKey => "NoApiKey",
            SearchError::ConnectionError(_) => "ConnectionError",
            SearchError::Timeout(_) => "Timeout",
            SearchError::HttpStatus(_) => "HttpStatus",
            SearchError::ParseError(_) => "ParseError",
            SearchError::RequestFailed(_) => "RequestFailed",
            SearchError::PageNotFound(_) => "PageNotFound",
            SearchError::ApiError(_) => "ApiError",
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SearchError::Timeout(e.to_string())
        } else if e.is_connect() {
            SearchError::ConnectionError(e.to_string())
        } else if let Some(status) = e.status() {
            SearchError::HttpStatus(status.as_u16())
        } else if e.is_decode() {
            SearchError::ParseError(e.to_string())
        } else {
            SearchError::RequestFailed(e.to_string())
        }
    }
}

/// One web search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebResult {
    pub title: String,
    pub snippet: String,
    pub link: String,
}

/// A web search provider
#[async_trait]
pub trait WebSearchBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebResult>, SearchError>;
}

/// HTTP client shared by the provider clients
pub(crate) fn http_client(timeout: Duration) -> Result<Client, SearchError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| SearchError::RequestFailed(e.to_string()))
}
