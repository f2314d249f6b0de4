use super::{Tool, ToolName};
use crate::search::{ArxivClient, Paper, SearchError};
use crate::utils::{normalize_whitespace, truncate_chars};
use async_trait::async_trait;
use tracing::warn;

pub struct ArxivTool {
    client: ArxivClient,
}

impl ArxivTool {
    pub fn new(client: ArxivClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for ArxivTool {
    fn name(&self) -> ToolName {
        ToolName::Arxiv
    }

    async fn run(&self, input: &str) -> String {
        let outcome = self.client.search(input, 1).await;
        if let Err(e) = &outcome {
            warn!(error = %e, "arXiv search failed");
        }
        describe(outcome)
    }
}

fn describe(outcome: Result<Vec<Paper>, SearchError>) -> String {
    match outcome {
        Ok(papers) => match papers.into_iter().next() {
            Some(paper) => {
                let title = normalize_whitespace(&paper.title);
                let abstract_text = normalize_whitespace(&paper.summary);
                format!(
                    "arXiv [{}...]\nLink: {}\nAbstract: {}...",
                    truncate_chars(&title, 60),
                    paper.entry_id,
                    truncate_chars(&abstract_text, 250)
                )
            }
            None => "No arXiv papers found.".to_string(),
        },
        Err(e) => format!("arXiv error: {}", e.kind()),
    }
}
