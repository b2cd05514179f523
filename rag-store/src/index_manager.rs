//! Idempotent provisioning of the hybrid index.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, instrument};

use crate::config::IndexSpec;
use crate::errors::RagError;
use crate::index::{VectorDatabase, VectorIndex};

/// Ensures the configured index exists and caches the opened handle.
///
/// The first successful [`ensure_index`](Self::ensure_index) lists, creates
/// if absent, and opens; every later call returns the same handle without
/// touching the control plane. A failed attempt is not cached.
pub struct IndexManager {
    db: Arc<dyn VectorDatabase>,
    spec: IndexSpec,
    handle: OnceCell<Arc<dyn VectorIndex>>,
}

impl IndexManager {
    pub fn new(db: Arc<dyn VectorDatabase>, spec: IndexSpec) -> Result<Self, RagError> {
        spec.validate()?;
        Ok(Self {
            db,
            spec,
            handle: OnceCell::new(),
        })
    }

    pub fn spec(&self) -> &IndexSpec {
        &self.spec
    }

    #[instrument(skip(self), fields(index = %self.spec.name))]
    pub async fn ensure_index(&self) -> Result<Arc<dyn VectorIndex>, RagError> {
        let handle = self
            .handle
            .get_or_try_init(|| async {
                let existing = self.db.list_indexes().await?;
                if existing.iter().any(|n| n == &self.spec.name) {
                    info!("index already exists");
                } else {
                    self.db.create_index(&self.spec).await?;
                    info!(
                        dimension = self.spec.dimension,
                        metric = self.spec.metric.as_str(),
                        "index created"
                    );
                }
                self.db.open_index(&self.spec).await
            })
            .await?;
        Ok(handle.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::memory::MemoryDatabase;

    #[tokio::test]
    async fn second_call_reuses_handle_without_remote_calls() {
        let db = Arc::new(MemoryDatabase::new());
        let mgr = IndexManager::new(db.clone(), IndexSpec::hybrid_default("us-east-1")).unwrap();

        let a = mgr.ensure_index().await.unwrap();
        let b = mgr.ensure_index().await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(db.create_calls(), 1);
        assert_eq!(db.list_calls(), 1);
    }

    #[tokio::test]
    async fn existing_index_is_not_recreated() {
        let db = Arc::new(MemoryDatabase::new());
        let spec = IndexSpec::hybrid_default("us-east-1");
        db.create_index(&spec).await.unwrap();

        let mgr = IndexManager::new(db.clone(), spec).unwrap();
        mgr.ensure_index().await.unwrap();
        assert_eq!(db.create_calls(), 1);
    }

    #[tokio::test]
    async fn concurrent_callers_create_once() {
        let db = Arc::new(MemoryDatabase::new());
        let mgr = Arc::new(IndexManager::new(db.clone(), IndexSpec::hybrid_default("us-east-1")).unwrap());

        let (a, b) = tokio::join!(mgr.ensure_index(), mgr.ensure_index());
        assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
        assert_eq!(db.create_calls(), 1);
    }
}
