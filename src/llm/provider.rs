use async_trait::async_trait;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;

    /// Whether the adapter holds a usable credential
    fn is_configured(&self) -> bool {
        true
    }
}

/// Configuration for an LLM provider
#[derive(Debug, Clone)]
pub struct LLMProviderConfig {
    pub name: String,
    pub api_key: String,
    /// Overrides the provider's default endpoint (OpenAI-compatible gateways, tests)
    pub api_base: Option<String>,
}

pub struct LLM {
    adapter: Box<dyn LLMAdapter>,
    provider_name: String,
}

impl LLM {
    pub fn new(provider: LLMProviderConfig) -> AppResult<Self> {
        let adapter: Box<dyn LLMAdapter> = match (provider.name.as_str(), provider.api_base.as_deref()) {
            ("groq", None) => Box::new(crate::llm::groq::GroqAdapter::new(&provider.api_key)),
            ("groq", Some(base)) | ("openai", Some(base)) => Box::new(
                crate::llm::openai::OpenAIAdapter::new_with_api_base(&provider.api_key, base),
            ),
            ("openai", None) => Box::new(crate::llm::openai::OpenAIAdapter::new(&provider.api_key)),
            (other, _) => {
                return Err(AppError::Config(format!("Unsupported provider: {}", other)));
            }
        };

        Ok(Self {
            adapter,
            provider_name: provider.name,
        })
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }
}

#[async_trait]
impl LLMAdapter for LLM {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }

    fn is_configured(&self) -> bool {
        self.adapter.is_configured()
    }
}
