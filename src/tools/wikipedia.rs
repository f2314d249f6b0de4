use super::{Tool, ToolName};
use crate::search::{SearchError, WikiLookup, WikipediaClient};
use crate::utils::truncate_chars;
use async_trait::async_trait;
use tracing::warn;

pub const DEFAULT_SENTENCES: u32 = 1;

const MAX_SUMMARY_CHARS: usize = 500;

pub struct WikipediaTool {
    client: WikipediaClient,
    sentences: u32,
}

impl WikipediaTool {
    pub fn new(client: WikipediaClient, sentences: u32) -> Self {
        Self { client, sentences }
    }
}

#[async_trait]
impl Tool for WikipediaTool {
    fn name(&self) -> ToolName {
        ToolName::Wikipedia
    }

    async fn run(&self, input: &str) -> String {
        let outcome = self.client.lookup(input, self.sentences).await;
        if let Err(e) = &outcome {
            warn!(error = %e, "Wikipedia lookup failed");
        }
        describe(outcome)
    }
}

fn describe(outcome: Result<WikiLookup, SearchError>) -> String {
    match outcome {
        Ok(WikiLookup::Page { title, summary }) => {
            format!("Wikipedia [{}]: {}", title, truncate_chars(&summary, MAX_SUMMARY_CHARS))
        }
        Ok(WikiLookup::Disambiguation { options, .. }) => {
            let candidates: Vec<&str> = options.iter().take(3).map(String::as_str).collect();
            format!("Wikipedia: Multiple matches. Try: {}", candidates.join(", "))
        }
        Ok(WikiLookup::NotFound) => "No Wikipedia page found.".to_string(),
        Err(e) => format!("Wikipedia error: {}", e.kind()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_no_page_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/w/api.php")
            .match_query(Matcher::Any)
            .with_body(json!({"query": {"search": []}}).to_string())
            .create_async()
            .await;

        let client = WikipediaClient::with_base_url(&server.url(), Duration::from_secs(5)).unwrap();
        let tool = WikipediaTool::new(client, DEFAULT_SENTENCES);

        assert_eq!(tool.run("zzzzqqq").await, "No Wikipedia page found.");
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let client = WikipediaClient::with_base_url("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
        let tool = WikipediaTool::new(client, DEFAULT_SENTENCES);

        assert_eq!(tool.run("Paris").await, "Wikipedia error: ConnectionError");
    }

    #[test]
    fn test_describe_page_and_disambiguation() {
        let page = describe(Ok(WikiLookup::Page {
            title: "Rust (programming language)".to_string(),
            summary: "Rust is a general-purpose programming language.".to_string(),
        }));
        assert_eq!(
            page,
            "Wikipedia [Rust (programming language)]: Rust is a general-purpose programming language."
        );

        let ambiguous = describe(Ok(WikiLookup::Disambiguation {
            title: "Mercury".to_string(),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        }));
        assert_eq!(ambiguous, "Wikipedia: Multiple matches. Try: A, B, C");
    }

    #[test]
    fn test_describe_bounds_summary() {
        let page = describe(Ok(WikiLookup::Page {
            title: "Long".to_string(),
            summary: "w".repeat(2000),
        }));
        assert_eq!(page.chars().count(), "Wikipedia [Long]: ".len() + MAX_SUMMARY_CHARS);
        assert_eq!(
            describe(Err(SearchError::PageNotFound("Nowhere".into()))),
            "Wikipedia error: PageNotFound"
        );
    }
}
