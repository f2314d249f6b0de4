use crate::agents::{DEFAULT_MAX_ITERS, MAX_MAX_ITERS, MIN_MAX_ITERS};
use crate::llm::ModelChoice;
use crate::middleware::RATE_LIMIT_HISTORY;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub agent: AgentConfig,
    pub rate_limit: RateLimitConfig,
    pub sessions: SessionConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub api_key: String,
    pub provider: String,
    pub api_base: Option<String>,
    pub model: ModelChoice,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub max_steps: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window_secs: u64,
}

/// Bounds on the HTTP API's in-memory session store
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub max_sessions: usize,
    pub idle_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub serpapi_key: Option<String>,
    pub region: String,
    pub max_results: usize,
    pub wikipedia_language: String,
    pub wikipedia_sentences: u32,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            serpapi_key: None,
            region: "us-en".to_string(),
            max_results: 3,
            wikipedia_language: "en".to_string(),
            wikipedia_sentences: 1,
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let config = Self {
            server: ServerConfig {
                port: parse(&var, "PORT", 3000)?,
                host: or("HOST", "0.0.0.0"),
            },
            llm: LLMConfig {
                api_key: or("GROQ_API_KEY", ""),
                provider: or("LLM_PROVIDER", "groq").to_lowercase(),
                api_base: var("LLM_API_BASE"),
                model: or("LLM_MODEL", ModelChoice::default().id())
                    .parse::<ModelChoice>()
                    .map_err(|e| anyhow::anyhow!(e))
                    .context("LLM_MODEL")?,
                timeout_secs: parse(&var, "LLM_TIMEOUT_SECS", 10)?,
            },
            agent: AgentConfig {
                max_steps: parse(&var, "AGENT_MAX_STEPS", DEFAULT_MAX_ITERS)?,
            },
            rate_limit: RateLimitConfig {
                max_requests: parse(&var, "RATE_LIMIT_MAX_REQUESTS", 5)?,
                window_secs: parse(&var, "RATE_LIMIT_WINDOW_SECS", 60)?,
            },
            sessions: SessionConfig {
                max_sessions: parse(&var, "SESSION_MAX_COUNT", 1000)?,
                idle_ttl_secs: parse(&var, "SESSION_IDLE_TTL_SECS", 3600)?,
            },
            search: SearchConfig {
                serpapi_key: var("SERPAPI_API_KEY"),
                region: or("WEB_SEARCH_REGION", "us-en"),
                max_results: parse(&var, "WEB_SEARCH_MAX_RESULTS", 3)?,
                wikipedia_language: or("WIKIPEDIA_LANGUAGE", "en"),
                wikipedia_sentences: parse(&var, "WIKIPEDIA_SENTENCES", 1)?,
                timeout_secs: parse(&var, "TOOL_TIMEOUT_SECS", 15)?,
            },
            logging: LoggingConfig {
                log_dir: var("LOG_DIR").map(PathBuf::from),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(MIN_MAX_ITERS..=MAX_MAX_ITERS).contains(&self.agent.max_steps) {
            bail!(
                "AGENT_MAX_STEPS must be between {} and {}, got {}",
                MIN_MAX_ITERS,
                MAX_MAX_ITERS,
                self.agent.max_steps
            );
        }
        if !(1..RATE_LIMIT_HISTORY).contains(&self.rate_limit.max_requests) {
            bail!(
                "RATE_LIMIT_MAX_REQUESTS must be between 1 and {}, got {}",
                RATE_LIMIT_HISTORY - 1,
                self.rate_limit.max_requests
            );
        }
        if self.sessions.max_sessions == 0 || self.sessions.idle_ttl_secs == 0 {
            bail!("SESSION_MAX_COUNT and SESSION_IDLE_TTL_SECS must be at least 1");
        }
        if self.llm.timeout_secs == 0 || self.search.timeout_secs == 0 {
            bail!("timeouts must be at least 1 second");
        }
        Ok(())
    }
}

fn parse<T, V>(var: &V, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.llm.provider, "groq");
        assert_eq!(config.llm.api_key, "");
        assert_eq!(config.llm.model, ModelChoice::Llama31_8bInstant);
        assert_eq!(config.llm.timeout_secs, 10);
        assert_eq!(config.agent.max_steps, 3);
        assert_eq!(config.rate_limit.max_requests, 5);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert_eq!(config.sessions.max_sessions, 1000);
        assert_eq!(config.sessions.idle_ttl_secs, 3600);
        assert_eq!(config.search.region, "us-en");
        assert_eq!(config.search.max_results, 3);
        assert_eq!(config.search.wikipedia_sentences, 1);
        assert!(config.search.serpapi_key.is_none());
        assert!(config.logging.log_dir.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("GROQ_API_KEY", "gsk_test"),
            ("LLM_MODEL", "gemma2-9b-it"),
            ("AGENT_MAX_STEPS", "6"),
            ("SERPAPI_API_KEY", "serp"),
            ("PORT", "8080"),
            ("LOG_DIR", "/tmp/logs"),
        ])
        .unwrap();
        assert_eq!(config.llm.api_key, "gsk_test");
        assert_eq!(config.llm.model, ModelChoice::Gemma2_9bIt);
        assert_eq!(config.agent.max_steps, 6);
        assert_eq!(config.search.serpapi_key.as_deref(), Some("serp"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.log_dir, Some(PathBuf::from("/tmp/logs")));
    }

    #[test]
    fn test_blank_values_use_defaults() {
        let config = config(&[("SERPAPI_API_KEY", "  "), ("PORT", "")]).unwrap();
        assert!(config.search.serpapi_key.is_none());
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(config(&[("PORT", "not-a-port")]).is_err());
        assert!(config(&[("AGENT_MAX_STEPS", "0")]).is_err());
        assert!(config(&[("AGENT_MAX_STEPS", "7")]).is_err());
        assert!(config(&[("LLM_MODEL", "gpt-4")]).is_err());
        assert!(config(&[("RATE_LIMIT_MAX_REQUESTS", "0")]).is_err());
        assert!(config(&[("SESSION_MAX_COUNT", "0")]).is_err());
    }

    #[test]
    fn test_rate_limit_threshold_must_fit_history() {
        // The limiter remembers 10 timestamps, so 10 or more could never trip
        assert!(config(&[("RATE_LIMIT_MAX_REQUESTS", "9")]).is_ok());
        assert!(config(&[("RATE_LIMIT_MAX_REQUESTS", "10")]).is_err());
        assert!(config(&[("RATE_LIMIT_MAX_REQUESTS", "50")]).is_err());
    }
}
