use std::fmt;

use crate::{
    config::llm_provider::LlmProvider,
    error_handler::{AiLlmError, ConfigError, validate_http_endpoint, validate_range_f32},
};

/// Configuration for an LLM model invocation.
///
/// # Fields
///
/// - `provider`: which hosted backend to call (Groq, OpenAI).
/// - `model`: the model identifier (e.g., `"llama3-8b-8192"`).
/// - `endpoint`: OpenAI-compatible base URL (e.g., `https://api.groq.com/openai/v1`).
/// - `api_key`: bearer credential for the provider.
/// - `max_tokens`: maximum number of tokens to generate (if supported).
/// - `temperature`: controls randomness (0.0 = deterministic).
/// - `top_p`: nucleus sampling cutoff.
/// - `timeout_secs`: optional request timeout in seconds.
///
/// `Debug` output redacts the API key.
#[derive(Clone, PartialEq)]
pub struct LlmModelConfig {
    pub provider: LlmProvider,
    pub model: String,
    pub endpoint: String,
    pub api_key: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub timeout_secs: Option<u64>,
}

impl LlmModelConfig {
    /// Checks model name, endpoint scheme, and sampling ranges.
    ///
    /// # Errors
    /// Returns [`AiLlmError::Config`] on the first invalid field.
    pub fn validate(&self) -> Result<(), AiLlmError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::EmptyModel.into());
        }
        validate_http_endpoint("LLM_ENDPOINT", self.endpoint.trim())?;
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingVar(self.provider.api_key_var()).into());
        }
        if let Some(t) = self.temperature {
            validate_range_f32("temperature", t, 0.0, 2.0)?;
        }
        if let Some(p) = self.top_p {
            validate_range_f32("top_p", p, 0.0, 1.0)?;
        }
        Ok(())
    }
}

impl fmt::Debug for LlmModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmModelConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn groq() -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Groq,
            model: "llama3-8b-8192".into(),
            endpoint: LlmProvider::Groq.default_endpoint().into(),
            api_key: "gsk_secret".into(),
            max_tokens: None,
            temperature: None,
            top_p: None,
            timeout_secs: Some(60),
        }
    }

    #[test]
    fn debug_hides_api_key() {
        let dbg = format!("{:?}", groq());
        assert!(!dbg.contains("gsk_secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn validate_catches_bad_fields() {
        assert!(groq().validate().is_ok());

        let mut cfg = groq();
        cfg.model = "  ".into();
        assert!(matches!(
            cfg.validate(),
            Err(AiLlmError::Config(ConfigError::EmptyModel))
        ));

        let mut cfg = groq();
        cfg.temperature = Some(3.0);
        assert!(cfg.validate().is_err());

        let mut cfg = groq();
        cfg.api_key = String::new();
        assert!(matches!(
            cfg.validate(),
            Err(AiLlmError::Config(ConfigError::MissingVar("GROQ_API_KEY")))
        ));
    }
}
