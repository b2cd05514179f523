//! Text generation seam over the shared LLM service.

use std::{future::Future, pin::Pin};

use ai_llm_service::{AiLlmError, LlmService};

/// Anything that turns a prompt into a completion.
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>>;

    /// Model identifier for logs.
    fn model(&self) -> &str;
}

impl TextGenerator for LlmService {
    fn generate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>> {
        // Single user message, no system prompt.
        Box::pin(LlmService::generate(self, prompt, None))
    }

    fn model(&self) -> &str {
        &self.config().model
    }
}
