//! Public API types re-used by external crates (e.g., the HTTP API layer).

use rag_store::ScoredDocument;
use serde::Serialize;

/// Per-call overrides. `None` falls back to the retriever's configured value.
#[derive(Clone, Debug, Default)]
pub struct AskOptions {
    pub top_k: Option<usize>,
}

/// Final answer together with the documents the prompt was built from.
///
/// # Example
/// ```
/// use contextor::QaAnswer;
/// let qa = QaAnswer { answer: "RAG retrieves, then generates.".into(), source_documents: vec![] };
/// assert!(!qa.answer.is_empty());
/// ```
#[derive(Clone, Debug, Serialize)]
pub struct QaAnswer {
    pub answer: String,
    pub source_documents: Vec<ScoredDocument>,
}
