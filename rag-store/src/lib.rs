//! Hybrid (dense + sparse) retrieval store.
//!
//! This crate provides:
//! - Dense embeddings via Hugging Face Inference (or a local hashing embedder)
//! - A BM25 sparse encoder fitted in memory
//! - Index backends: Pinecone (REST), Qdrant (`qdrant-client`), in-memory
//! - Idempotent index provisioning and a hybrid retriever on top

mod config;
mod corpus;
mod embed;
mod encoders;
mod errors;
mod index;
mod index_manager;
mod record;
mod retriever;
mod sparse;

pub use config::{HybridConfig, IndexSpec, MAX_TOP_K, Metric, ServerlessSpec, validate_top_k};
pub use corpus::{DEMO_CORPUS, demo_corpus};
pub use embed::hashing::HashingEmbedder;
pub use embed::hf_inference::{
    DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL, DEFAULT_HF_ENDPOINT, HfConfig, HfEmbedder,
};
pub use embed::{BoxFuture, EmbeddingsProvider};
pub use encoders::{EncoderBundle, build_encoders};
pub use errors::RagError;
pub use index::memory::{MemoryDatabase, MemoryIndex};
pub use index::pinecone::{PineconeClient, PineconeConfig};
pub use index::qdrant_facade::{QdrantConfig, QdrantDatabase};
pub use index::{VectorDatabase, VectorIndex};
pub use index_manager::IndexManager;
pub use record::{
    CONTENT_KEY, HybridPoint, HybridQuery, ScoredDocument, SparseValues, document_id,
};
pub use retriever::{HybridRetriever, hybrid_convex_scale};
pub use sparse::{Bm25Encoder, Bm25Params};
