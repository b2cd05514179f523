//! Thin adapter around `qdrant-client` for the sparse-dense backend.
//!
//! A collection carries a named dense vector (`dense`, dot product) and a named
//! sparse vector (`sparse`). Queries prefetch both and fuse with RRF, so the
//! alpha weighting of the query only matters for the dense/sparse candidate
//! lists, not the final score.

use std::sync::Arc;

use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, Fusion, NamedVectors, PointStruct,
    PrefetchQueryBuilder, Query, QueryPointsBuilder, ScoredPoint, SparseVectorParamsBuilder,
    SparseVectorsConfigBuilder, UpsertPointsBuilder, Vector, VectorInput, VectorParamsBuilder,
    VectorsConfigBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::{debug, info, warn};

use crate::config::IndexSpec;
use crate::embed::BoxFuture;
use crate::errors::RagError;
use crate::index::{VectorDatabase, VectorIndex};
use crate::record::{CONTENT_KEY, HybridPoint, HybridQuery, ScoredDocument};

const DENSE: &str = "dense";
const SPARSE: &str = "sparse";

#[derive(Clone)]
pub struct QdrantConfig {
    pub url: String,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for QdrantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QdrantConfig")
            .field("url", &self.url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Control plane over Qdrant collections.
pub struct QdrantDatabase {
    client: Arc<Qdrant>,
}

impl QdrantDatabase {
    pub fn new(cfg: &QdrantConfig) -> Result<Self, RagError> {
        if cfg.url.trim().is_empty() {
            return Err(RagError::Config("Qdrant URL is empty".into()));
        }
        let mut builder = Qdrant::from_url(cfg.url.trim());
        if let Some(key) = &cfg.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;
        info!(url = %cfg.url, "Qdrant client initialized");
        Ok(Self {
            client: Arc::new(client),
        })
    }

    async fn list(&self) -> Result<Vec<String>, RagError> {
        let res = self
            .client
            .list_collections()
            .await
            .map_err(|e| RagError::Qdrant(format!("list_collections: {e}")))?;
        Ok(res.collections.into_iter().map(|c| c.name).collect())
    }

    async fn create(&self, spec: &IndexSpec) -> Result<(), RagError> {
        spec.validate()?;
        info!(
            collection = %spec.name,
            dimension = spec.dimension,
            "creating Qdrant collection"
        );

        let mut dense = VectorsConfigBuilder::default();
        dense.add_named_vector_params(
            DENSE,
            VectorParamsBuilder::new(spec.dimension as u64, Distance::Dot),
        );
        let mut sparse = SparseVectorsConfigBuilder::default();
        sparse.add_named_vector_params(SPARSE, SparseVectorParamsBuilder::default());

        let created = self
            .client
            .create_collection(
                CreateCollectionBuilder::new(&spec.name)
                    .vectors_config(dense)
                    .sparse_vectors_config(sparse),
            )
            .await;
        match created {
            Ok(_) => Ok(()),
            Err(e) => {
                let exists_now = self
                    .client
                    .collection_exists(&spec.name)
                    .await
                    .unwrap_or(false);
                creation_outcome(&spec.name, &e.to_string(), exists_now)
            }
        }
    }

    async fn open(&self, spec: &IndexSpec) -> Result<Arc<dyn VectorIndex>, RagError> {
        let exists = self
            .client
            .collection_exists(&spec.name)
            .await
            .map_err(|e| RagError::Qdrant(format!("collection_exists: {e}")))?;
        if !exists {
            return Err(RagError::IndexNotFound(spec.name.clone()));
        }
        Ok(Arc::new(QdrantIndex {
            client: self.client.clone(),
            collection: spec.name.clone(),
        }))
    }
}

/// A failed create still succeeds when the collection exists afterwards.
fn creation_outcome(name: &str, err: &str, exists_now: bool) -> Result<(), RagError> {
    if exists_now || err.contains("already exists") {
        warn!(collection = %name, "collection already exists (created concurrently)");
        return Ok(());
    }
    Err(RagError::Qdrant(format!("create_collection: {err}")))
}

impl VectorDatabase for QdrantDatabase {
    fn list_indexes<'a>(&'a self) -> BoxFuture<'a, Vec<String>> {
        Box::pin(self.list())
    }

    fn create_index<'a>(&'a self, spec: &'a IndexSpec) -> BoxFuture<'a, ()> {
        Box::pin(self.create(spec))
    }

    fn open_index<'a>(&'a self, spec: &'a IndexSpec) -> BoxFuture<'a, Arc<dyn VectorIndex>> {
        Box::pin(self.open(spec))
    }
}

/// One Qdrant collection.
pub struct QdrantIndex {
    client: Arc<Qdrant>,
    collection: String,
}

impl QdrantIndex {
    async fn upsert_points(&self, points: Vec<HybridPoint>) -> Result<usize, RagError> {
        if points.is_empty() {
            return Ok(0);
        }
        let n = points.len();
        let mut out = Vec::with_capacity(n);
        for p in points {
            out.push(to_point(p)?);
        }

        debug!(collection = %self.collection, count = n, "upserting points");
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, out).wait(true))
            .await
            .map_err(|e| RagError::Qdrant(format!("upsert_points: {e}")))?;
        Ok(n)
    }

    async fn query_points(&self, query: &HybridQuery) -> Result<Vec<ScoredDocument>, RagError> {
        let limit = query.top_k as u64;
        let mut builder = QueryPointsBuilder::new(&self.collection).add_prefetch(
            PrefetchQueryBuilder::default()
                .query(Query::new_nearest(query.dense.clone()))
                .using(DENSE)
                .limit(limit),
        );
        if !query.sparse.is_empty() {
            builder = builder.add_prefetch(
                PrefetchQueryBuilder::default()
                    .query(Query::new_nearest(VectorInput::new_sparse(
                        query.sparse.indices.clone(),
                        query.sparse.values.clone(),
                    )))
                    .using(SPARSE)
                    .limit(limit),
            );
        }
        let builder = builder
            .query(Query::new_fusion(Fusion::Rrf))
            .limit(limit)
            .with_payload(true);

        let res = self
            .client
            .query(builder)
            .await
            .map_err(|e| RagError::Qdrant(format!("query: {e}")))?;
        debug!(
            collection = %self.collection,
            hits = res.result.len(),
            "query completed"
        );
        Ok(res.result.into_iter().map(to_scored).collect())
    }
}

impl VectorIndex for QdrantIndex {
    fn name(&self) -> &str {
        &self.collection
    }

    fn upsert<'a>(&'a self, points: Vec<HybridPoint>) -> BoxFuture<'a, usize> {
        Box::pin(self.upsert_points(points))
    }

    fn query<'a>(&'a self, query: &'a HybridQuery) -> BoxFuture<'a, Vec<ScoredDocument>> {
        Box::pin(self.query_points(query))
    }
}

fn to_point(p: HybridPoint) -> Result<PointStruct, RagError> {
    let payload = Payload::try_from(serde_json::json!({ CONTENT_KEY: p.content }))
        .map_err(|e| RagError::Qdrant(format!("payload: {e}")))?;
    let mut vectors = NamedVectors::default().add_vector(DENSE, Vector::new_dense(p.dense));
    if !p.sparse.is_empty() {
        vectors = vectors.add_vector(
            SPARSE,
            Vector::new_sparse(p.sparse.indices, p.sparse.values),
        );
    }
    Ok(PointStruct::new(p.id, vectors, payload))
}

fn to_scored(p: ScoredPoint) -> ScoredDocument {
    use qdrant_client::qdrant::point_id::PointIdOptions;
    let id = match p.id.as_ref().and_then(|pid| pid.point_id_options.as_ref()) {
        Some(PointIdOptions::Uuid(u)) => u.clone(),
        Some(PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    };
    let content = p
        .payload
        .get(CONTENT_KEY)
        .cloned()
        .map(|v| v.into_json())
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    ScoredDocument {
        id,
        score: p.score,
        content,
    }
}
