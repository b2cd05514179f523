//! Default chat-model config loaded from environment variables.
//!
//! # Environment variables
//!
//! - `LLM_PROVIDER`   = `groq` (default) or `openai`
//! - `GROQ_API_KEY` / `OPENAI_API_KEY` = credential for the selected provider (mandatory)
//! - `LLM_MODEL`      = model id (default depends on provider)
//! - `LLM_ENDPOINT`   = OpenAI-compatible base URL (default depends on provider)
//! - `LLM_MAX_TOKENS` = optional max tokens (u32)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, env_opt_u32, must_env, opt_env, process_env},
};

/// Resolves the provider from `LLM_PROVIDER`, defaulting to Groq.
///
/// # Errors
/// [`crate::error_handler::ConfigError::UnsupportedProvider`] for unknown names.
pub fn provider_from<F>(lookup: &F) -> Result<LlmProvider, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    match opt_env(lookup, "LLM_PROVIDER") {
        Some(name) => Ok(name.parse::<LlmProvider>()?),
        None => Ok(LlmProvider::Groq),
    }
}

/// Constructs the config for the answering chat model from the process env.
pub fn config_chat_from_env() -> Result<LlmModelConfig, AiLlmError> {
    config_chat_from(&process_env)
}

/// Constructs the config for the answering chat model.
///
/// # Defaults
/// - `temperature = None` (provider default)
/// - `timeout_secs = Some(60)`
///
/// # Errors
/// - [`crate::error_handler::ConfigError::MissingVar`] if the provider key is absent
/// - [`crate::error_handler::ConfigError::InvalidNumber`] if `LLM_MAX_TOKENS` is invalid
/// - any validation error from [`LlmModelConfig::validate`]
pub fn config_chat_from<F>(lookup: &F) -> Result<LlmModelConfig, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    let provider = provider_from(lookup)?;
    let api_key = must_env(lookup, provider.api_key_var())?;
    let model =
        opt_env(lookup, "LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string());
    let endpoint = opt_env(lookup, "LLM_ENDPOINT")
        .unwrap_or_else(|| provider.default_endpoint().to_string());
    let max_tokens = env_opt_u32(lookup, "LLM_MAX_TOKENS")?;

    let cfg = LlmModelConfig {
        provider,
        model,
        endpoint,
        api_key,
        max_tokens,
        temperature: None,
        top_p: None,
        timeout_secs: Some(60),
    };
    cfg.validate()?;
    Ok(cfg)
}
