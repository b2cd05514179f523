//! Typed error for the contextor crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// Retrieval failed (embedding, sparse encoding or index query).
    #[error("{0}")]
    Rag(#[from] rag_store::RagError),

    /// Generation failed at the LLM provider.
    #[error("{0}")]
    Llm(#[from] ai_llm_service::AiLlmError),

    /// The model produced an empty or blank answer.
    #[error("LLM returned an empty answer")]
    EmptyAnswer,

    /// Question was empty or whitespace.
    #[error("question must not be empty")]
    EmptyQuestion,

    /// Prompt template is missing a slot.
    #[error("invalid prompt template: {0}")]
    Template(String),
}
