// Oxidized ReAct - research agent over web, Wikipedia and arXiv lookups

pub mod agents;
pub mod config;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod repl;
pub mod routes;
pub mod search;
pub mod session;
pub mod tools;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;

use agents::ReactAgent;
use llm::{LLMProviderConfig, LLM};
use std::sync::Arc;
use tools::Toolbox;

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}

/// Wire the configured LLM provider and search tools into an agent
pub fn build_agent(config: &Config) -> anyhow::Result<ReactAgent> {
    let llm = LLM::new(LLMProviderConfig {
        name: config.llm.provider.clone(),
        api_key: config.llm.api_key.clone(),
        api_base: config.llm.api_base.clone(),
    })?;
    let tools = Toolbox::from_config(&config.search)?;

    Ok(ReactAgent::new(Arc::new(llm), Arc::new(tools))
        .with_provider(config.llm.provider.clone())
        .with_timeout(config.llm.timeout_secs))
}
