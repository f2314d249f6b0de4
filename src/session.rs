//! Conversation Session
//!
//! A chat session owns what outlives a single question: the turn history, the
//! per-session rate limiter and the model/step settings. Asking goes through
//! [`ChatSession::ask`], which rejects before any model or tool call when the
//! caller is over the rate limit or no credential is configured.

use crate::agents::{AgentOutcome, AgentSettings, ReactAgent, MAX_MAX_ITERS, MIN_MAX_ITERS};
use crate::config::{RateLimitConfig, SessionConfig};
use crate::llm::ModelChoice;
use crate::middleware::{RateLimitExceeded, RateLimiter};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("⏱️ Too many requests. Wait {wait_secs}s.")]
    RateLimited { wait_secs: u64 },

    #[error("🔑 Please add your GROQ API Key.")]
    MissingApiKey,

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Question is empty")]
    EmptyQuestion,
}

impl From<RateLimitExceeded> for SessionError {
    fn from(e: RateLimitExceeded) -> Self {
        SessionError::RateLimited { wait_secs: e.wait_secs }
    }
}

/// One completed exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub user: String,
    pub assistant: String,
    pub timestamp: DateTime<Utc>,
}

pub type SessionSettings = AgentSettings;

pub struct ChatSession {
    turns: Vec<Turn>,
    limiter: RateLimiter,
    settings: SessionSettings,
}

impl ChatSession {
    pub fn new(settings: SessionSettings, limiter: RateLimiter) -> Self {
        Self {
            turns: Vec::new(),
            limiter,
            settings,
        }
    }

    /// Run one question through `agent`.
    ///
    /// Rejections leave the history untouched. Every run that starts is
    /// recorded, including ones whose answer reports a failure.
    pub async fn ask(&mut self, agent: &ReactAgent, question: &str) -> Result<AgentOutcome, SessionError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }

        self.limiter.check().inspect_err(|e| {
            warn!(wait_secs = e.wait_secs, "Question rejected by rate limiter");
        })?;

        if !agent.is_configured() {
            return Err(SessionError::MissingApiKey);
        }

        let outcome = agent.run(question, &self.settings).await;

        if outcome.kind.is_error() {
            info!(kind = ?outcome.kind, "Run ended with an error answer");
        }
        self.turns.push(Turn {
            user: question.to_string(),
            assistant: outcome.answer.clone(),
            timestamp: Utc::now(),
        });

        Ok(outcome)
    }

    pub fn history(&self) -> &[Turn] {
        &self.turns
    }

    pub fn clear_history(&mut self) {
        self.turns.clear();
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn set_model(&mut self, model: ModelChoice) {
        self.settings.model = model;
    }

    pub fn set_max_steps(&mut self, max_steps: usize) -> Result<(), SessionError> {
        if !(MIN_MAX_ITERS..=MAX_MAX_ITERS).contains(&max_steps) {
            return Err(SessionError::InvalidSettings(format!(
                "max steps must be between {} and {}, got {}",
                MIN_MAX_ITERS, MAX_MAX_ITERS, max_steps
            )));
        }
        self.settings.max_iters = max_steps;
        Ok(())
    }
}

pub type SharedSession = Arc<Mutex<ChatSession>>;

struct StoredSession {
    session: SharedSession,
    last_used: DateTime<Utc>,
}

/// Sessions of the HTTP API, keyed by id.
///
/// Sessions idle for longer than the configured TTL are dropped, and once
/// the store is full the least recently used one makes room for a new one.
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, StoredSession>>,
    defaults: SessionSettings,
    rate_limit: RateLimitConfig,
    max_sessions: usize,
    idle_ttl: TimeDelta,
}

impl SessionStore {
    pub fn new(defaults: SessionSettings, rate_limit: RateLimitConfig, limits: &SessionConfig) -> Self {
        let idle_secs = i64::try_from(limits.idle_ttl_secs).unwrap_or(i64::MAX);
        Self {
            sessions: Mutex::new(HashMap::new()),
            defaults,
            rate_limit,
            max_sessions: limits.max_sessions.max(1),
            idle_ttl: TimeDelta::try_seconds(idle_secs).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Existing session for `id`, or a fresh one (under `id` when given)
    pub async fn get_or_create(&self, id: Option<Uuid>) -> (Uuid, SharedSession) {
        self.get_or_create_at(id, Utc::now()).await
    }

    async fn get_or_create_at(&self, id: Option<Uuid>, now: DateTime<Utc>) -> (Uuid, SharedSession) {
        let mut sessions = self.sessions.lock().await;
        self.prune_idle(&mut sessions, now);

        let id = id.unwrap_or_else(Uuid::new_v4);
        if !sessions.contains_key(&id) && sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, stored)| stored.last_used)
                .map(|(oldest, _)| *oldest);
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
                debug!(session_id = %oldest, "Evicted least recently used session");
            }
        }

        let stored = sessions.entry(id).or_insert_with(|| {
            info!(session_id = %id, "Creating chat session");
            StoredSession {
                session: Arc::new(Mutex::new(ChatSession::new(
                    self.defaults,
                    RateLimiter::new(self.rate_limit.max_requests, self.rate_limit.window_secs),
                ))),
                last_used: now,
            }
        });
        stored.last_used = now;
        (id, stored.session.clone())
    }

    pub async fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.get_at(id, Utc::now()).await
    }

    async fn get_at(&self, id: &Uuid, now: DateTime<Utc>) -> Option<SharedSession> {
        let mut sessions = self.sessions.lock().await;
        self.prune_idle(&mut sessions, now);

        let stored = sessions.get_mut(id)?;
        stored.last_used = now;
        Some(stored.session.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    fn prune_idle(&self, sessions: &mut HashMap<Uuid, StoredSession>, now: DateTime<Utc>) {
        let before = sessions.len();
        sessions.retain(|_, stored| now.signed_duration_since(stored.last_used) < self.idle_ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            debug!(expired, "Dropped idle sessions");
        }
    }
}
