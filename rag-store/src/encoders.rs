//! Dense + sparse encoder bundle built once at startup.

use std::sync::Arc;

use tracing::info;

use crate::embed::EmbeddingsProvider;
use crate::errors::RagError;
use crate::sparse::Bm25Encoder;

/// Encoders shared by ingestion and retrieval.
///
/// `sparse` is fitted on `corpus`; documents ingested from another corpus
/// would be scored against mismatched statistics.
#[derive(Clone)]
pub struct EncoderBundle {
    pub dense: Arc<dyn EmbeddingsProvider>,
    pub sparse: Arc<Bm25Encoder>,
    pub corpus: Arc<Vec<String>>,
}

/// Fits BM25 on `corpus` and pairs it with `dense`.
///
/// # Errors
/// `RagError::EmptyCorpus` if the corpus has no indexable terms.
pub fn build_encoders(
    dense: Arc<dyn EmbeddingsProvider>,
    corpus: Vec<String>,
) -> Result<EncoderBundle, RagError> {
    let sparse = Bm25Encoder::fitted(&corpus)?;
    info!(
        docs = corpus.len(),
        dense_dim = dense.dim(),
        "encoders ready"
    );
    Ok(EncoderBundle {
        dense,
        sparse: Arc::new(sparse),
        corpus: Arc::new(corpus),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::demo_corpus;
    use crate::embed::hashing::HashingEmbedder;

    #[test]
    fn bundle_is_fitted_on_corpus() {
        let dense = Arc::new(HashingEmbedder::new(384).unwrap());
        let b = build_encoders(dense, demo_corpus()).unwrap();
        assert!(b.sparse.is_fitted());
        assert_eq!(b.corpus.len(), 6);
        assert_eq!(b.dense.dim(), 384);
    }

    #[test]
    fn empty_corpus_fails() {
        let dense = Arc::new(HashingEmbedder::new(8).unwrap());
        assert!(matches!(
            build_encoders(dense, Vec::new()),
            Err(RagError::EmptyCorpus)
        ));
    }
}
