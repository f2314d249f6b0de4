use crate::agents::{OutcomeKind, ReactAgent, ReasoningStep};
use crate::config::Config;
use crate::llm::ModelChoice;
use crate::session::{SessionStore, Turn};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub agent: Arc<ReactAgent>,
    pub sessions: Arc<SessionStore>,
}

// API Request/Response types

#[derive(Debug, serde::Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<uuid::Uuid>,
    /// Switches the session's model for this and later questions
    pub model: Option<ModelChoice>,
    pub max_steps: Option<usize>,
}

#[derive(Debug, serde::Serialize)]
pub struct ChatResponse {
    pub session_id: uuid::Uuid,
    pub answer: String,
    pub outcome: OutcomeKind,
    pub steps: Vec<ReasoningStep>,
}

#[derive(Debug, serde::Serialize)]
pub struct HistoryResponse {
    pub session_id: uuid::Uuid,
    pub turns: Vec<Turn>,
}

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub llm_configured: bool,
    pub sessions: usize,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
