//! Models the agent can be pointed at.
//!
//! Both are small, fast instruction-tuned models served by Groq; the ReAct
//! prompt is tuned for their output style.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const LLAMA_3_1_8B_INSTANT: &str = "llama-3.1-8b-instant";
pub const GEMMA2_9B_IT: &str = "gemma2-9b-it";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelChoice {
    #[default]
    #[serde(rename = "llama-3.1-8b-instant")]
    Llama31_8bInstant,
    #[serde(rename = "gemma2-9b-it")]
    Gemma2_9bIt,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 2] = [ModelChoice::Llama31_8bInstant, ModelChoice::Gemma2_9bIt];

    /// Identifier sent to the provider
    pub fn id(&self) -> &'static str {
        match self {
            ModelChoice::Llama31_8bInstant => LLAMA_3_1_8B_INSTANT,
            ModelChoice::Gemma2_9bIt => GEMMA2_9B_IT,
        }
    }
}

impl fmt::Display for ModelChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ModelChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ModelChoice::ALL
            .into_iter()
            .find(|m| m.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let known: Vec<&str> = ModelChoice::ALL.iter().map(|m| m.id()).collect();
                format!("unknown model '{}' (expected one of: {})", wanted, known.join(", "))
            })
    }
}
