// LLM abstraction layer

pub mod provider;
pub mod openai;
pub mod groq;
pub mod models;

pub use provider::*;
pub use models::ModelChoice;
pub use crate::types::*;
