use std::str::FromStr;

use crate::error_handler::ConfigError;

/// Hosted backend used for chat completions.
///
/// Both providers speak the OpenAI chat-completions protocol, so they share a
/// single client; they differ in base URL, default model and the environment
/// variable that carries the API key.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_provider::LlmProvider;
///
/// let p: LlmProvider = "groq".parse().unwrap();
/// assert_eq!(p.api_key_var(), "GROQ_API_KEY");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Groq cloud (OpenAI-compatible endpoint).
    Groq,
    /// OpenAI API.
    OpenAI,
}

impl LlmProvider {
    /// Base URL used when `LLM_ENDPOINT` is not set.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            LlmProvider::Groq => "https://api.groq.com/openai/v1",
            LlmProvider::OpenAI => "https://api.openai.com/v1",
        }
    }

    /// Model used when `LLM_MODEL` is not set.
    pub fn default_model(self) -> &'static str {
        match self {
            LlmProvider::Groq => "llama3-8b-8192",
            LlmProvider::OpenAI => "gpt-4o-mini",
        }
    }

    /// Environment variable holding the provider credential.
    pub fn api_key_var(self) -> &'static str {
        match self {
            LlmProvider::Groq => "GROQ_API_KEY",
            LlmProvider::OpenAI => "OPENAI_API_KEY",
        }
    }
}

impl FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(LlmProvider::Groq),
            "openai" | "chatgpt" => Ok(LlmProvider::OpenAI),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}
