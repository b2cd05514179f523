//! Deterministic local embedder.
//!
//! Hashes stemmed tokens into a fixed number of buckets and L2-normalizes the
//! result. No network access; used for offline wiring checks and tests.

use crate::embed::{BoxFuture, EmbeddingsProvider};
use crate::errors::RagError;
use crate::sparse::tokenizer::Tokenizer;

pub struct HashingEmbedder {
    dim: usize,
    tokenizer: Tokenizer,
}

impl HashingEmbedder {
    /// # Errors
    /// `RagError::Config` for a zero dimension.
    pub fn new(dim: usize) -> Result<Self, RagError> {
        if dim == 0 {
            return Err(RagError::Config(
                "embedding dimension must be greater than 0".into(),
            ));
        }
        Ok(Self {
            dim,
            tokenizer: Tokenizer::english()?,
        })
    }

    /// Synchronous variant of [`EmbeddingsProvider::embed`].
    pub fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        for token in self.tokenizer.tokenize(text) {
            let h = blake3::hash(token.as_bytes());
            let bytes = h.as_bytes();
            let bucket = u64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]) as usize
                % self.dim;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
            v[bucket] += sign;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

impl EmbeddingsProvider for HashingEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Vec<f32>> {
        Box::pin(async move { Ok(self.embed_sync(text)) })
    }

    fn dim(&self) -> usize {
        self.dim
    }
}
