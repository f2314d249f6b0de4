//! ReAct Agent
//!
//! Drives one question to one answer. Each step the model sees the question,
//! the rolling history window and the latest observation, then either writes
//! a `Final Answer:` or names a tool to call. The loop is bounded by
//! `max_iters`; when the budget runs out without a final answer, one summary
//! call over the tail of the history produces the answer instead.
//!
//! ```text
//!   ┌──────────────┐  Final Answer   ┌────────┐
//!   │  LLM step n  │ ──────────────▶ │ answer │
//!   └──────────────┘                 └────────┘
//!     │ Action/Input        ▲
//!     ▼                     │ n < max_iters
//!   ┌──────────────┐        │
//!   │ tool → obs   │ ───────┘
//!   └──────────────┘
//!     │ n == max_iters
//!     ▼
//!   summary call ──▶ answer
//! ```

use crate::agents::history::HistoryWindow;
use crate::agents::parser::parse_agent_output;
use crate::agents::prompt::{build_conversation, build_summary_context, SUMMARY_PROMPT, SYSTEM_PROMPT};
use crate::llm::{LLMAdapter, ModelChoice};
use crate::tools::Toolbox;
use crate::types::{AppResult, LLMMessage, LLMRequest};
use crate::utils::truncate_chars;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_ITERS: usize = 3;
pub const MIN_MAX_ITERS: usize = 1;
pub const MAX_MAX_ITERS: usize = 6;

pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 10;

const FINAL_ANSWER_MARKER: &str = "Final Answer:";
const REASONING_MAX_TOKENS: u32 = 400;
const SUMMARY_MAX_TOKENS: u32 = 200;
const TEMPERATURE: f32 = 0.2;
const OBSERVATION_WINDOW_CHARS: usize = 200;
const ERROR_REASON_CHARS: usize = 100;

pub const PARSE_FAILURE_MESSAGE: &str = "❌ Agent couldn't determine next action. Try rephrasing.";

/// Per-question knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSettings {
    pub model: ModelChoice,
    pub max_iters: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: ModelChoice::default(),
            max_iters: DEFAULT_MAX_ITERS,
        }
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The model wrote a `Final Answer:`
    FinalAnswer,
    /// Step budget spent; the answer comes from the summary call
    Summarized,
    /// No usable action in a response
    ParseFailure,
    /// A reasoning call to the provider failed
    TransportFailure,
    /// The summary call failed
    SummaryFailure,
}

impl OutcomeKind {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            OutcomeKind::ParseFailure | OutcomeKind::TransportFailure | OutcomeKind::SummaryFailure
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub tool: String,
    pub input: String,
    pub observation: String,
}

/// One model response and the tool call it led to, if any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub step: usize,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolInvocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOutcome {
    pub answer: String,
    pub kind: OutcomeKind,
    pub steps: Vec<ReasoningStep>,
}

pub struct ReactAgent {
    llm: Arc<dyn LLMAdapter>,
    tools: Arc<Toolbox>,
    provider: String,
    timeout_secs: u64,
}

impl ReactAgent {
    pub fn new(llm: Arc<dyn LLMAdapter>, tools: Arc<Toolbox>) -> Self {
        Self {
            llm,
            tools,
            provider: "groq".to_string(),
            timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Whether the underlying provider has a credential
    pub fn is_configured(&self) -> bool {
        self.llm.is_configured()
    }

    /// Answer `question`. Always yields an answer string; failures are
    /// reported in it and in `kind`.
    pub async fn run(&self, question: &str, settings: &AgentSettings) -> AgentOutcome {
        info!(
            question_len = question.len(),
            model = %settings.model,
            max_iters = settings.max_iters,
            "Starting agent run"
        );

        let mut history = HistoryWindow::default();
        let mut observation: Option<String> = None;
        let mut steps = Vec::new();

        for step in 1..=settings.max_iters {
            let conversation = build_conversation(question, &history, observation.as_deref());

            let text = match self
                .complete(settings.model, SYSTEM_PROMPT, conversation, REASONING_MAX_TOKENS)
                .await
            {
                Ok(text) => text,
                Err(e) => {
                    warn!(step, error = %e, "Reasoning call failed");
                    let answer = format!("❌ API Error: {}", truncate_chars(&e.to_string(), ERROR_REASON_CHARS));
                    return finish(answer, OutcomeKind::TransportFailure, steps);
                }
            };

            debug!(step, response_len = text.len(), "Reasoning step received");

            if let Some((_, answer)) = text.split_once(FINAL_ANSWER_MARKER) {
                let answer = answer.trim().to_string();
                steps.push(ReasoningStep { step, response: text, tool: None });
                info!(step, "Agent reached a final answer");
                return finish(answer, OutcomeKind::FinalAnswer, steps);
            }

            let parsed = parse_agent_output(&text);
            let (action, input) = match (parsed.action, parsed.input) {
                (Some(action), Some(input)) if !input.is_empty() => (action, input),
                _ => {
                    warn!(step, "No usable action in model response");
                    steps.push(ReasoningStep { step, response: text, tool: None });
                    return finish(PARSE_FAILURE_MESSAGE.to_string(), OutcomeKind::ParseFailure, steps);
                }
            };

            info!(step, tool = %action, input = %truncate_chars(&input, 50), "Using tool");
            let result = self.tools.dispatch(&action, &input).await;

            history.push(format!("Thought: Using {}", action));
            history.push(format!("Action: {}", action));
            history.push(format!("Action Input: {}", input));
            history.push(format!("Observation: {}", truncate_chars(&result, OBSERVATION_WINDOW_CHARS)));

            steps.push(ReasoningStep {
                step,
                response: text,
                tool: Some(ToolInvocation {
                    tool: action,
                    input,
                    observation: result.clone(),
                }),
            });
            observation = Some(result);
        }

        info!(max_iters = settings.max_iters, "Step budget spent, summarizing");

        match self
            .complete(settings.model, SUMMARY_PROMPT, build_summary_context(&history), SUMMARY_MAX_TOKENS)
            .await
        {
            Ok(summary) => finish(summary, OutcomeKind::Summarized, steps),
            Err(e) => {
                warn!(error = %e, "Summary call failed");
                let answer = format!(
                    "❌ Summarization failed: {}",
                    truncate_chars(&e.to_string(), ERROR_REASON_CHARS)
                );
                finish(answer, OutcomeKind::SummaryFailure, steps)
            }
        }
    }

    async fn complete(
        &self,
        model: ModelChoice,
        system: &str,
        user: String,
        max_tokens: u32,
    ) -> AppResult<String> {
        let request = LLMRequest {
            provider: self.provider.clone(),
            model: model.id().to_string(),
            messages: vec![LLMMessage::user(user)],
            max_tokens: Some(max_tokens),
            temperature: Some(TEMPERATURE),
            system_instruction: Some(system.to_string()),
            timeout_secs: Some(self.timeout_secs),
        };

        let response = self.llm.create_chat_completion(&request).await?;
        Ok(response.content)
    }
}

fn finish(answer: String, kind: OutcomeKind, steps: Vec<ReasoningStep>) -> AgentOutcome {
    AgentOutcome { answer, kind, steps }
}
