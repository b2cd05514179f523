//! Hybrid (dense + sparse) retrieval over one index.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument};

use crate::config::{HybridConfig, validate_top_k};
use crate::encoders::EncoderBundle;
use crate::errors::RagError;
use crate::index::VectorIndex;
use crate::record::{HybridPoint, HybridQuery, ScoredDocument, SparseValues, document_id};

/// Convex combination of a dense and a sparse query vector.
///
/// Dense values are multiplied by `alpha`, sparse values by `1 - alpha`.
///
/// # Errors
/// `RagError::Config` if `alpha` is outside `0.0..=1.0`.
pub fn hybrid_convex_scale(
    dense: &[f32],
    sparse: &SparseValues,
    alpha: f32,
) -> Result<(Vec<f32>, SparseValues), RagError> {
    if !(alpha.is_finite() && (0.0..=1.0).contains(&alpha)) {
        return Err(RagError::Config(format!(
            "alpha must be within 0.0..=1.0, got {alpha}"
        )));
    }
    let dense = dense.iter().map(|v| v * alpha).collect();
    Ok((dense, sparse.scaled(1.0 - alpha)))
}

pub struct HybridRetriever {
    index: Arc<dyn VectorIndex>,
    encoders: EncoderBundle,
    cfg: HybridConfig,
}

impl HybridRetriever {
    pub fn new(
        index: Arc<dyn VectorIndex>,
        encoders: EncoderBundle,
        cfg: HybridConfig,
    ) -> Result<Self, RagError> {
        cfg.validate()?;
        Ok(Self {
            index,
            encoders,
            cfg,
        })
    }

    pub fn index_name(&self) -> &str {
        self.index.name()
    }

    pub fn config(&self) -> &HybridConfig {
        &self.cfg
    }

    pub fn encoders(&self) -> &EncoderBundle {
        &self.encoders
    }

    /// Encodes and upserts `texts` in batches. Returns the number upserted.
    #[instrument(skip_all, fields(index = %self.index.name(), docs = texts.len()))]
    pub async fn add_documents(&self, texts: &[String]) -> Result<usize, RagError> {
        let started = Instant::now();
        let want = self.encoders.dense.dim();
        let mut total = 0usize;

        for chunk in texts.chunks(self.cfg.upsert_batch) {
            let mut points = Vec::with_capacity(chunk.len());
            for text in chunk {
                let dense = self.encoders.dense.embed(text).await?;
                if dense.len() != want {
                    return Err(RagError::VectorSizeMismatch {
                        got: dense.len(),
                        want,
                    });
                }
                points.push(HybridPoint {
                    id: document_id(text),
                    dense,
                    sparse: self.encoders.sparse.encode_document(text)?,
                    content: text.clone(),
                });
            }
            let n = self.index.upsert(points).await?;
            debug!(batch = chunk.len(), upserted = n, "batch upserted");
            total += n;
        }

        info!(
            upserted = total,
            latency_ms = started.elapsed().as_millis(),
            "documents added"
        );
        Ok(total)
    }

    /// Top-`k` documents for `query`, in the index's ranking order.
    #[instrument(skip(self), fields(index = %self.index.name()))]
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredDocument>, RagError> {
        validate_top_k(k)?;
        let started = Instant::now();

        let dense = self.encoders.dense.embed(query).await?;
        let want = self.encoders.dense.dim();
        if dense.len() != want {
            return Err(RagError::VectorSizeMismatch {
                got: dense.len(),
                want,
            });
        }
        let sparse = self.encoders.sparse.encode_query(query)?;
        let (dense, sparse) = hybrid_convex_scale(&dense, &sparse, self.cfg.alpha)?;

        let hits = self
            .index
            .query(&HybridQuery {
                dense,
                sparse,
                top_k: k,
            })
            .await?;

        debug!(
            k,
            hits = hits.len(),
            latency_ms = started.elapsed().as_millis(),
            "retrieve completed"
        );
        Ok(hits)
    }

    /// [`retrieve`](Self::retrieve) with the configured default `top_k`.
    pub async fn retrieve_default(&self, query: &str) -> Result<Vec<ScoredDocument>, RagError> {
        self.retrieve(query, self.cfg.top_k).await
    }
}
