//! Shared LLM service used by the answer pipeline.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Owns one chat client (HTTP connection pool) and one health checker.
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::config::default_config::config_chat_from_env;
//! use ai_llm_service::llm_service::LlmService;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmService::new(config_chat_from_env()?, Some(10))?);
//! let txt = svc.generate("Hello world", None).await?;
//! println!("{txt}");
//! # Ok(()) }
//! ```

use tracing::instrument;

use crate::{
    config::llm_model_config::LlmModelConfig,
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::chat_completions_service::ChatCompletionsService,
};

/// Chat generation plus health probing for a single configured model.
pub struct LlmService {
    chat: ChatCompletionsService,
    health: HealthService,
}

impl LlmService {
    /// Builds the chat client and the health checker.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if the config is invalid or a client cannot be built.
    pub fn new(cfg: LlmModelConfig, health_timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        cfg.validate()?;
        Ok(Self {
            chat: ChatCompletionsService::new(cfg)?,
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Generates text for `prompt` with an optional system instruction.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if generation fails.
    #[instrument(skip_all, fields(model = %self.chat.config().model))]
    pub async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, AiLlmError> {
        self.chat.generate(prompt, system).await
    }

    /// Health snapshot of the configured provider/model.
    pub async fn health(&self) -> HealthStatus {
        self.health.check(self.chat.config()).await
    }

    /// The active model config.
    pub fn config(&self) -> &LlmModelConfig {
        self.chat.config()
    }
}
