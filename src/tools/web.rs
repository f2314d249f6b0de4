use super::{Tool, ToolName};
use crate::search::{SearchError, WebResult, WebSearchBackend};
use crate::utils::truncate_chars;
use async_trait::async_trait;
use tracing::warn;

pub const DEFAULT_MAX_RESULTS: usize = 3;

const NO_RESULTS: &str = "No web results found.";

pub struct WebSearchTool {
    backend: Box<dyn WebSearchBackend>,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(backend: Box<dyn WebSearchBackend>, max_results: usize) -> Self {
        Self {
            backend,
            max_results: max_results.max(1),
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> ToolName {
        ToolName::WebSearch
    }

    async fn run(&self, input: &str) -> String {
        let outcome = self.backend.search(input, self.max_results).await;
        if let Err(e) = &outcome {
            warn!(backend = self.backend.name(), error = %e, "Web search failed");
        }
        describe(outcome)
    }
}

fn describe(outcome: Result<Vec<WebResult>, SearchError>) -> String {
    match outcome {
        Ok(results) if results.is_empty() => NO_RESULTS.to_string(),
        Ok(results) => results
            .iter()
            .map(|r| {
                let title = if r.title.is_empty() { "No title" } else { r.title.as_str() };
                format!(
                    "• {}\n  {}\n  {}",
                    truncate_chars(title, 60),
                    truncate_chars(&r.snippet, 120),
                    r.link
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Err(e) => format!(
            "Web search error: {} - {}",
            e.kind(),
            truncate_chars(&e.to_string(), 100)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::DuckDuckGoClient;
    use std::time::Duration;

    struct StaticBackend(Vec<WebResult>);

    #[async_trait]
    impl WebSearchBackend for StaticBackend {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<WebResult>, SearchError> {
            Ok(self.0.iter().take(max_results).cloned().collect())
        }
    }

    fn hit(title: &str, snippet: &str, link: &str) -> WebResult {
        WebResult {
            title: title.to_string(),
            snippet: snippet.to_string(),
            link: link.to_string(),
        }
    }

    #[tokio::test]
    async fn test_formats_results() {
        let long_title = "T".repeat(80);
        let long_snippet = "s".repeat(200);
        let backend = StaticBackend(vec![
            hit(&long_title, &long_snippet, "https://a.example"),
            hit("", "body", "https://b.example"),
            hit("dropped", "", "https://c.example"),
        ]);

        let tool = WebSearchTool::new(Box::new(backend), 2);
        let observation = tool.run("query").await;
        let lines: Vec<&str> = observation.lines().collect();

        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], format!("• {}", "T".repeat(60)));
        assert_eq!(lines[1], format!("  {}", "s".repeat(120)));
        assert_eq!(lines[2], "  https://a.example");
        assert_eq!(lines[3], "• No title");
        assert!(!observation.contains("dropped"));
    }

    #[tokio::test]
    async fn test_no_results() {
        let tool = WebSearchTool::new(Box::new(StaticBackend(vec![])), 3);
        assert_eq!(tool.run("nothing").await, "No web results found.");
    }

    #[tokio::test]
    async fn test_connection_error_becomes_observation() {
        let backend = DuckDuckGoClient::with_base_url("http://127.0.0.1:1", "us-en", Duration::from_secs(2)).unwrap();
        let tool = WebSearchTool::new(Box::new(backend), 3);

        let observation = tool.run("rust").await;
        assert!(observation.starts_with("Web search error: ConnectionError - "));
        let message = observation.trim_start_matches("Web search error: ConnectionError - ");
        assert!(message.chars().count() <= 100);
    }

    #[test]
    fn test_error_message_is_truncated() {
        let observation = describe(Err(SearchError::RequestFailed("x".repeat(500))));
        assert!(observation.starts_with("Web search error: RequestFailed - search request failed: "));
        assert_eq!(observation.chars().count(), "Web search error: RequestFailed - ".len() + 100);
    }
}
