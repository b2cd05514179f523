//! Vector index backends.
//!
//! A [`VectorDatabase`] is the control plane (list/create/open indexes); a
//! [`VectorIndex`] is one opened index (upsert/query). Both are object-safe
//! so the composition root can pick a backend at runtime.

use std::sync::Arc;

use crate::config::IndexSpec;
use crate::embed::BoxFuture;
use crate::record::{HybridPoint, HybridQuery, ScoredDocument};

pub mod memory;
pub mod pinecone;
pub mod qdrant_facade;

/// Control plane of a hosted vector database.
pub trait VectorDatabase: Send + Sync {
    /// Names of the existing indexes.
    fn list_indexes<'a>(&'a self) -> BoxFuture<'a, Vec<String>>;

    /// Creates the index and returns once it is ready to serve.
    ///
    /// Creating an index that already exists is not an error.
    fn create_index<'a>(&'a self, spec: &'a IndexSpec) -> BoxFuture<'a, ()>;

    /// Opens a data-plane handle for an existing index.
    fn open_index<'a>(&'a self, spec: &'a IndexSpec) -> BoxFuture<'a, Arc<dyn VectorIndex>>;
}

/// Data plane of one index.
pub trait VectorIndex: Send + Sync {
    fn name(&self) -> &str;

    /// Inserts or overwrites points by id. Returns the number acknowledged.
    fn upsert<'a>(&'a self, points: Vec<HybridPoint>) -> BoxFuture<'a, usize>;

    /// Hybrid similarity query, best match first.
    fn query<'a>(&'a self, query: &'a HybridQuery) -> BoxFuture<'a, Vec<ScoredDocument>>;
}
