//! Core data models used by the library.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata key under which document text is stored in the index.
pub const CONTENT_KEY: &str = "context";

/// Deterministic document id derived from its content.
///
/// Identity is the text itself; re-ingesting the same passage overwrites
/// the existing point instead of adding a duplicate.
pub fn document_id(content: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, content.as_bytes()).to_string()
}

/// Sparse term-weight vector (`indices[i]` carries `values[i]`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseValues {
    pub indices: Vec<u32>,
    pub values: Vec<f32>,
}

impl SparseValues {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Multiplies every weight by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            indices: self.indices.clone(),
            values: self.values.iter().map(|v| v * factor).collect(),
        }
    }

    /// Dot product against another sparse vector.
    pub fn dot(&self, other: &SparseValues) -> f32 {
        let mut sum = 0.0;
        for (i, idx) in self.indices.iter().enumerate() {
            if let Some(j) = other.indices.iter().position(|o| o == idx) {
                sum += self.values[i] * other.values[j];
            }
        }
        sum
    }
}

/// One unit of upsert: dense + sparse representation of a document.
#[derive(Clone, Debug)]
pub struct HybridPoint {
    pub id: String,
    pub dense: Vec<f32>,
    pub sparse: SparseValues,
    pub content: String,
}

/// A hybrid similarity query. Vectors are already weighted.
#[derive(Clone, Debug)]
pub struct HybridQuery {
    pub dense: Vec<f32>,
    pub sparse: SparseValues,
    pub top_k: usize,
}

/// A single ranked match returned by an index.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredDocument {
    pub id: String,
    pub score: f32,
    pub content: String,
}
