//! Agent System
//!
//! The ReAct agent that answers one question at a time:
//!
//! - **Parser**: pulls `Action:` / `Action Input:` out of free-form model text
//! - **History**: bounded window of recent reasoning lines fed back as context
//! - **Prompt**: system instructions and per-step user turns
//! - **React**: the bounded think → act → observe loop
//!
//! ## Loop Overview
//!
//! ```text
//! Question
//!    │
//!    ▼
//! ┌─────────────┐   Final Answer
//! │  LLM step   │ ─────────────────▶ Answer
//! └─────────────┘
//!    │ Action
//!    ▼
//! ┌─────────────┐
//! │  Toolbox    │  → WebSearch / Wikipedia / Arxiv
//! └─────────────┘
//!    │ Observation (back to next step)
//!    ▼
//!  Summary call once the step budget is spent
//! ```

pub mod history;
pub mod parser;
pub mod prompt;
pub mod react;

pub use history::{HistoryWindow, HISTORY_CAPACITY};
pub use parser::{parse_agent_output, ParsedAction};
pub use react::{
    AgentOutcome, AgentSettings, OutcomeKind, ReactAgent, ReasoningStep, ToolInvocation,
    DEFAULT_MAX_ITERS, MAX_MAX_ITERS, MIN_MAX_ITERS,
};
