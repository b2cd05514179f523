use crate::errors::RagError;
use std::{future::Future, pin::Pin};

/// Boxed future returned by the async provider traits of this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, RagError>> + Send + 'a>>;

/// Provider interface for dense embedding generation.
///
/// Async because the production provider is a hosted HTTP service.
pub trait EmbeddingsProvider: Send + Sync {
    /// Embeds a single text into a dense vector.
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Vec<f32>>;

    /// Output dimensionality.
    fn dim(&self) -> usize;
}

pub mod hashing;
pub mod hf_inference;
