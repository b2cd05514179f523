//! Index and retrieval configuration.

use crate::errors::RagError;

/// Similarity metric of the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    /// Cosine similarity.
    Cosine,
    /// Dot product (required by Pinecone for sparse-dense queries).
    DotProduct,
    /// Euclidean distance (L2).
    Euclidean,
}

impl Metric {
    /// Wire name used by Pinecone.
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Cosine => "cosine",
            Metric::DotProduct => "dotproduct",
            Metric::Euclidean => "euclidean",
        }
    }
}

/// Where a serverless index is provisioned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerlessSpec {
    pub cloud: String,
    pub region: String,
}

/// Identity and shape of the remote index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: usize,
    pub metric: Metric,
    pub serverless: ServerlessSpec,
}

impl IndexSpec {
    /// Name, dimension, and metric used by the demo (`all-MiniLM-L6-v2` → 384).
    pub fn hybrid_default(region: impl Into<String>) -> Self {
        Self {
            name: "hybrid-search-index".into(),
            dimension: 384,
            metric: Metric::DotProduct,
            serverless: ServerlessSpec {
                cloud: "aws".into(),
                region: region.into(),
            },
        }
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(RagError::Config("index name is empty".into()));
        }
        if name.len() > 45
            || !name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(RagError::Config(format!(
                "index name '{name}' must be lowercase alphanumeric or '-' and at most 45 chars"
            )));
        }
        if self.dimension == 0 {
            return Err(RagError::Config("index dimension must be > 0".into()));
        }
        if self.serverless.cloud.trim().is_empty() || self.serverless.region.trim().is_empty() {
            return Err(RagError::Config("serverless cloud/region is empty".into()));
        }
        Ok(())
    }
}

/// Largest `topK` a Pinecone query accepts.
pub const MAX_TOP_K: usize = 10_000;

/// Checks `k` against `1..=MAX_TOP_K`.
pub fn validate_top_k(k: usize) -> Result<(), RagError> {
    if k == 0 || k > MAX_TOP_K {
        return Err(RagError::Config(format!(
            "top_k must be within 1..={MAX_TOP_K}, got {k}"
        )));
    }
    Ok(())
}

/// Knobs of the hybrid retriever.
#[derive(Clone, Debug, PartialEq)]
pub struct HybridConfig {
    /// Dense weight in `0.0..=1.0`; sparse gets `1 - alpha`.
    pub alpha: f32,
    /// Default number of documents returned by `retrieve`.
    pub top_k: usize,
    /// Upsert batch size.
    pub upsert_batch: usize,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            top_k: 4,
            upsert_batch: 32,
        }
    }
}

impl HybridConfig {
    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if !(self.alpha.is_finite() && (0.0..=1.0).contains(&self.alpha)) {
            return Err(RagError::Config(format!(
                "alpha must be within 0.0..=1.0, got {}",
                self.alpha
            )));
        }
        validate_top_k(self.top_k)?;
        if self.upsert_batch == 0 {
            return Err(RagError::Config("upsert_batch must be > 0".into()));
        }
        Ok(())
    }
}
