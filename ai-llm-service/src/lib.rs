//! Shared LLM plumbing: provider config from env, an OpenAI-compatible chat
//! client, health probes, and the tracing subscriber setup used by the binary.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod llm_service;
pub mod services;
pub mod telemetry;

pub use config::{
    default_config::{config_chat_from, config_chat_from_env, provider_from},
    llm_model_config::LlmModelConfig,
    llm_provider::LlmProvider,
};
pub use error_handler::AiLlmError;
pub use health_service::HealthStatus;
pub use llm_service::LlmService;
