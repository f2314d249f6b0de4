//! Tool Adapters
//!
//! The three tools the agent can call. Every adapter turns its provider's
//! outcome (results, nothing found, ambiguity, failure) into one short
//! observation string; none of them returns an error, so a failing lookup
//! never aborts the reasoning loop.

pub mod arxiv;
pub mod web;
pub mod wikipedia;

pub use arxiv::ArxivTool;
pub use web::WebSearchTool;
pub use wikipedia::WikipediaTool;

use crate::config::SearchConfig;
use crate::search::{ArxivClient, DuckDuckGoClient, SearchError, SerpApiClient, WebSearchBackend, WikipediaClient};
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The tools the agent knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    WebSearch,
    Wikipedia,
    Arxiv,
}

impl ToolName {
    pub const ALL: [ToolName; 3] = [ToolName::WebSearch, ToolName::Wikipedia, ToolName::Arxiv];

    /// Title-case spelling produced by the action parser and used for dispatch
    pub fn normalized(&self) -> &'static str {
        match self {
            ToolName::WebSearch => "Websearch",
            ToolName::Wikipedia => "Wikipedia",
            ToolName::Arxiv => "Arxiv",
        }
    }

    /// Exact match against the normalized spelling
    pub fn from_normalized(name: &str) -> Option<Self> {
        ToolName::ALL.into_iter().find(|tool| tool.normalized() == name)
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.normalized())
    }
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> ToolName;

    /// Run the lookup and describe the outcome; never fails
    async fn run(&self, input: &str) -> String;
}

/// One adapter per tool, addressed by normalized name
pub struct Toolbox {
    web: Box<dyn Tool>,
    wikipedia: Box<dyn Tool>,
    arxiv: Box<dyn Tool>,
}

impl Toolbox {
    pub fn new(web: Box<dyn Tool>, wikipedia: Box<dyn Tool>, arxiv: Box<dyn Tool>) -> Self {
        Self { web, wikipedia, arxiv }
    }

    /// Build the real adapters. SerpAPI backs web search when a key is set,
    /// the DuckDuckGo HTML frontend otherwise.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        let timeout = Duration::from_secs(config.timeout_secs);

        let backend: Box<dyn WebSearchBackend> = match SerpApiClient::from_config(config) {
            Some(serpapi) => Box::new(serpapi),
            None => Box::new(DuckDuckGoClient::new(&config.region, timeout)?),
        };
        info!(backend = backend.name(), "Web search backend selected");

        Ok(Self::new(
            Box::new(WebSearchTool::new(backend, config.max_results)),
            Box::new(WikipediaTool::new(
                WikipediaClient::new(&config.wikipedia_language, timeout)?,
                config.wikipedia_sentences,
            )),
            Box::new(ArxivTool::new(ArxivClient::new(timeout)?)),
        ))
    }

    pub fn get(&self, tool: ToolName) -> &dyn Tool {
        match tool {
            ToolName::WebSearch => self.web.as_ref(),
            ToolName::Wikipedia => self.wikipedia.as_ref(),
            ToolName::Arxiv => self.arxiv.as_ref(),
        }
    }

    /// Run the tool named `action` (normalized spelling). Unknown names
    /// produce an observation instead of an error.
    pub async fn dispatch(&self, action: &str, input: &str) -> String {
        match ToolName::from_normalized(action) {
            Some(tool) => {
                debug!(tool = %tool, input = %input, "Dispatching tool");
                self.get(tool).run(input).await
            }
            None => {
                warn!(action = %action, "Unknown tool requested");
                format!("Unknown tool: {}", action)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Records every input and answers with a fixed observation
    pub struct FakeTool {
        pub name: ToolName,
        pub observation: String,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeTool {
        pub fn new(name: ToolName, observation: &str) -> Self {
            Self {
                name,
                observation: observation.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Tool for std::sync::Arc<FakeTool> {
        fn name(&self) -> ToolName {
            self.name
        }

        async fn run(&self, input: &str) -> String {
            self.calls.lock().unwrap().push(input.to_string());
            self.observation.clone()
        }
    }

    pub struct FakeTools {
        pub web: std::sync::Arc<FakeTool>,
        pub wikipedia: std::sync::Arc<FakeTool>,
        pub arxiv: std::sync::Arc<FakeTool>,
    }

    impl FakeTools {
        pub fn new() -> Self {
            Self {
                web: std::sync::Arc::new(FakeTool::new(ToolName::WebSearch, "web observation")),
                wikipedia: std::sync::Arc::new(FakeTool::new(ToolName::Wikipedia, "wiki observation")),
                arxiv: std::sync::Arc::new(FakeTool::new(ToolName::Arxiv, "arxiv observation")),
            }
        }

        pub fn toolbox(&self) -> Toolbox {
            Toolbox::new(
                Box::new(self.web.clone()),
                Box::new(self.wikipedia.clone()),
                Box::new(self.arxiv.clone()),
            )
        }

        pub fn total_calls(&self) -> usize {
            [&self.web, &self.wikipedia, &self.arxiv]
                .iter()
                .map(|tool| tool.calls.lock().unwrap().len())
                .sum()
        }
    }
}
