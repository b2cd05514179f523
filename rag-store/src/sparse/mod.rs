//! Sparse lexical encoding (BM25).

pub mod bm25;
pub mod tokenizer;

pub use bm25::{Bm25Encoder, Bm25Params};
