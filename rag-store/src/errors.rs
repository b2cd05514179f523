//! Unified error types for the crate.

use reqwest::StatusCode;
use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// HTTP transport failure talking to a hosted service.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Hosted service answered with a non-success status.
    #[error("{service} returned HTTP {status} for {url}: {snippet}")]
    HttpStatus {
        service: &'static str,
        status: StatusCode,
        url: String,
        snippet: String,
    },

    /// Response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// JSON parsing / serialization errors.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Mismatch between an embedding and the index dimensionality.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Sparse encoder used before `fit`.
    #[error("sparse encoder is not fitted")]
    EncoderNotFitted,

    /// Sparse encoder fitted on an empty corpus.
    #[error("cannot fit sparse encoder on an empty corpus")]
    EmptyCorpus,

    /// Newly created index did not become ready in time.
    #[error("index '{name}' not ready after {waited_secs}s")]
    IndexNotReady { name: String, waited_secs: u64 },

    /// Named index does not exist.
    #[error("index '{0}' not found")]
    IndexNotFound(String),

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),
}

/// Trims an error body for logs and messages.
pub(crate) fn make_snippet(body: &str) -> String {
    let flat: String = body
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(240)
        .collect();
    flat.trim().to_string()
}
