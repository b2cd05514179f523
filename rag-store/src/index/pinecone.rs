//! Pinecone REST client (serverless, sparse-dense).
//!
//! Control plane (`https://api.pinecone.io`):
//! - GET  /indexes         : list
//! - POST /indexes         : create (serverless spec)
//! - GET  /indexes/{name}  : data-plane host and readiness
//!
//! Data plane (`https://{host}`):
//! - POST /vectors/upsert
//! - POST /query

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::config::IndexSpec;
use crate::embed::BoxFuture;
use crate::errors::{RagError, make_snippet};
use crate::index::{VectorDatabase, VectorIndex};
use crate::record::{CONTENT_KEY, HybridPoint, HybridQuery, ScoredDocument, SparseValues};

pub const DEFAULT_CONTROL_URL: &str = "https://api.pinecone.io";
pub const API_VERSION: &str = "2025-04";

#[derive(Clone)]
pub struct PineconeConfig {
    pub api_key: String,
    pub control_url: String,
    pub namespace: String,
    pub timeout_secs: u64,
    /// Upper bound on waiting for a freshly created index.
    pub ready_timeout_secs: u64,
    pub poll_interval_ms: u64,
}

impl PineconeConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            control_url: DEFAULT_CONTROL_URL.into(),
            namespace: String::new(),
            timeout_secs: 30,
            ready_timeout_secs: 120,
            poll_interval_ms: 1000,
        }
    }
}

impl std::fmt::Debug for PineconeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PineconeConfig")
            .field("api_key", &"<redacted>")
            .field("control_url", &self.control_url)
            .field("namespace", &self.namespace)
            .field("timeout_secs", &self.timeout_secs)
            .field("ready_timeout_secs", &self.ready_timeout_secs)
            .finish()
    }
}

/// Control-plane client.
pub struct PineconeClient {
    http: reqwest::Client,
    cfg: PineconeConfig,
    control_url: String,
}

impl PineconeClient {
    /// # Errors
    /// `RagError::Config` for an empty key or a control URL without scheme.
    pub fn new(cfg: PineconeConfig) -> Result<Self, RagError> {
        if cfg.api_key.trim().is_empty() {
            return Err(RagError::Config("Pinecone API key is empty".into()));
        }
        let control_url = cfg.control_url.trim().trim_end_matches('/').to_string();
        if !(control_url.starts_with("http://") || control_url.starts_with("https://")) {
            return Err(RagError::Config(format!(
                "Pinecone control URL '{control_url}' must start with http:// or https://"
            )));
        }

        let mut headers = header::HeaderMap::new();
        let mut key = header::HeaderValue::from_str(cfg.api_key.trim())
            .map_err(|e| RagError::Config(format!("invalid Pinecone API key header: {e}")))?;
        key.set_sensitive(true);
        headers.insert(header::HeaderName::from_static("api-key"), key);
        headers.insert(
            header::HeaderName::from_static("x-pinecone-api-version"),
            header::HeaderValue::from_static(API_VERSION),
        );

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .default_headers(headers)
            .build()?;

        info!(control_url = %control_url, "Pinecone client initialized");
        Ok(Self {
            http,
            cfg,
            control_url,
        })
    }

    async fn describe(&self, name: &str) -> Result<IndexModel, RagError> {
        let url = format!("{}/indexes/{name}", self.control_url);
        let resp = self.http.get(&url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(RagError::IndexNotFound(name.to_string()));
        }
        let resp = check_status(resp, &url).await?;
        resp.json()
            .await
            .map_err(|e| RagError::Decode(format!("describe index: {e}")))
    }

    async fn wait_ready(&self, name: &str) -> Result<IndexModel, RagError> {
        let started = Instant::now();
        let limit = Duration::from_secs(self.cfg.ready_timeout_secs);
        loop {
            let model = self.describe(name).await?;
            if model.status.ready {
                info!(
                    index = %name,
                    waited_ms = started.elapsed().as_millis(),
                    "index is ready"
                );
                return Ok(model);
            }
            if started.elapsed() >= limit {
                return Err(RagError::IndexNotReady {
                    name: name.to_string(),
                    waited_secs: self.cfg.ready_timeout_secs,
                });
            }
            debug!(index = %name, state = %model.status.state, "waiting for index");
            tokio::time::sleep(Duration::from_millis(self.cfg.poll_interval_ms)).await;
        }
    }

    async fn list(&self) -> Result<Vec<String>, RagError> {
        let url = format!("{}/indexes", self.control_url);
        let resp = check_status(self.http.get(&url).send().await?, &url).await?;
        let list: IndexList = resp
            .json()
            .await
            .map_err(|e| RagError::Decode(format!("list indexes: {e}")))?;
        Ok(list.indexes.into_iter().map(|i| i.name).collect())
    }

    async fn create(&self, spec: &IndexSpec) -> Result<(), RagError> {
        spec.validate()?;
        let url = format!("{}/indexes", self.control_url);
        let body = CreateIndexRequest {
            name: &spec.name,
            dimension: spec.dimension,
            metric: spec.metric.as_str(),
            spec: CreateSpec {
                serverless: Serverless {
                    cloud: &spec.serverless.cloud,
                    region: &spec.serverless.region,
                },
            },
        };

        info!(
            index = %spec.name,
            dimension = spec.dimension,
            metric = spec.metric.as_str(),
            cloud = %spec.serverless.cloud,
            region = %spec.serverless.region,
            "creating Pinecone index"
        );
        let resp = self.http.post(&url).json(&body).send().await?;
        if resp.status() == StatusCode::CONFLICT {
            warn!(index = %spec.name, "index already exists (created concurrently)");
        } else {
            check_status(resp, &url).await?;
        }

        self.wait_ready(&spec.name).await.map(|_| ())
    }

    async fn open(&self, spec: &IndexSpec) -> Result<Arc<dyn VectorIndex>, RagError> {
        let mut model = self.describe(&spec.name).await?;
        // Listed but still initializing, e.g. created by another process.
        if !model.status.ready {
            model = self.wait_ready(&spec.name).await?;
        }
        if model.dimension.is_some_and(|d| d != spec.dimension) {
            return Err(RagError::Config(format!(
                "index '{}' has dimension {:?}, expected {}",
                spec.name, model.dimension, spec.dimension
            )));
        }
        let host = model
            .host
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| RagError::Decode(format!("index '{}' has no host", spec.name)))?;
        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", host.trim_end_matches('/'))
        };

        debug!(index = %spec.name, host = %base, "opened Pinecone index");
        Ok(Arc::new(PineconeIndex {
            http: self.http.clone(),
            name: spec.name.clone(),
            namespace: self.cfg.namespace.clone(),
            url_upsert: format!("{base}/vectors/upsert"),
            url_query: format!("{base}/query"),
        }))
    }
}

impl VectorDatabase for PineconeClient {
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

/// Data-plane handle of one Pinecone index.
pub struct PineconeIndex {
    http: reqwest::Client,
    name: String,
    namespace: String,
    url_upsert: String,
    url_query: String,
}

impl PineconeIndex {
    async fn upsert_points(&self, points: Vec<HybridPoint>) -> Result<usize, RagError> {
        if points.is_empty() {
            return Ok(0);
        }
        let vectors: Vec<UpsertVector<'_>> = points
            .iter()
            .map(|p| UpsertVector {
                id: &p.id,
                values: &p.dense,
                sparse_values: (!p.sparse.is_empty()).then_some(&p.sparse),
                metadata: Metadata {
                    context: &p.content,
                },
            })
            .collect();
        let body = UpsertRequest {
            vectors,
            namespace: &self.namespace,
        };

        debug!(index = %self.name, count = points.len(), "POST {}", self.url_upsert);
        let resp = self.http.post(&self.url_upsert).json(&body).send().await?;
        let resp = check_status(resp, &self.url_upsert).await?;
        let out: UpsertResponse = resp
            .json()
            .await
            .map_err(|e| RagError::Decode(format!("upsert response: {e}")))?;
        Ok(out.upserted_count)
    }

    async fn query_points(&self, query: &HybridQuery) -> Result<Vec<ScoredDocument>, RagError> {
        let body = QueryRequest {
            vector: &query.dense,
            sparse_vector: (!query.sparse.is_empty()).then_some(&query.sparse),
            top_k: query.top_k,
            include_metadata: true,
            include_values: false,
            namespace: &self.namespace,
        };

        debug!(index = %self.name, top_k = query.top_k, "POST {}", self.url_query);
        let resp = self.http.post(&self.url_query).json(&body).send().await?;
        let resp = check_status(resp, &self.url_query).await?;
        let out: QueryResponse = resp
            .json()
            .await
            .map_err(|e| RagError::Decode(format!("query response: {e}")))?;

        Ok(out
            .matches
            .into_iter()
            .map(|m| {
                let content = m
                    .metadata
                    .as_ref()
                    .and_then(|md| md.get(CONTENT_KEY))
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        warn!(id = %m.id, "match has no '{CONTENT_KEY}' metadata");
                        String::new()
                    });
                ScoredDocument {
                    id: m.id,
                    score: m.score,
                    content,
                }
            })
            .collect())
    }
}

impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        &self.name
    }

    fn upsert<'a>(&'a self, points: Vec<HybridPoint>) -> BoxFuture<'a, usize> {
        Box::pin(self.upsert_points(points))
    }

    fn query<'a>(&'a self, query: &'a HybridQuery) -> BoxFuture<'a, Vec<ScoredDocument>> {
        Box::pin(self.query_points(query))
    }
}

async fn check_status(resp: reqwest::Response, url: &str) -> Result<reqwest::Response, RagError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let snippet = make_snippet(&resp.text().await.unwrap_or_default());
    error!(%status, %url, %snippet, "Pinecone returned non-success status");
    Err(RagError::HttpStatus {
        service: "pinecone",
        status,
        url: url.to_string(),
        snippet,
    })
}

/* ===========================================================================
HTTP payloads
======================================================================== */

#[derive(Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: usize,
    metric: &'a str,
    spec: CreateSpec<'a>,
}

#[derive(Serialize)]
struct CreateSpec<'a> {
    serverless: Serverless<'a>,
}

#[derive(Serialize)]
struct Serverless<'a> {
    cloud: &'a str,
    region: &'a str,
}

#[derive(Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexModel>,
}

#[derive(Deserialize)]
struct IndexModel {
    name: String,
    #[serde(default)]
    dimension: Option<usize>,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    status: IndexStatus,
}

#[derive(Deserialize, Default)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    state: String,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: Vec<UpsertVector<'a>>,
    #[serde(skip_serializing_if = "str::is_empty")]
    namespace: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpsertVector<'a> {
    id: &'a str,
    values: &'a [f32],
    #[serde(skip_serializing_if = "Option::is_none")]
    sparse_values: Option<&'a SparseValues>,
    metadata: Metadata<'a>,
}

#[derive(Serialize)]
struct Metadata<'a> {
    context: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    #[serde(skip_serializing_if = "Option::is_none")]
    sparse_vector: Option<&'a SparseValues>,
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    namespace: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, Value>>,
}
