//! RAG + LLM gateway.
//!
//! [`AnswerGenerator::answer`] retrieves the top-K documents for a question
//! with the hybrid retriever from `rag-store`, fills the prompt template with
//! their contents, sends it to the LLM as one user message, and returns the
//! answer together with the source documents.

mod api_types;
mod error;
mod generator;
mod llm;
mod prompt;

pub use api_types::{AskOptions, QaAnswer};
pub use error::ContextorError;
pub use generator::AnswerGenerator;
pub use llm::TextGenerator;
pub use prompt::{DEFAULT_TEMPLATE, PromptTemplate};
