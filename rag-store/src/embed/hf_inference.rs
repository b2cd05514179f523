//! Hugging Face Inference embedding provider.
//!
//! Calls the hosted feature-extraction pipeline:
//! - POST {endpoint}/{model}/pipeline/feature-extraction with `{"inputs": text}`
//!
//! The pipeline answers either with a pooled sentence vector or with a
//! per-token matrix; the matrix is mean-pooled here.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embed::{BoxFuture, EmbeddingsProvider};
use crate::errors::{RagError, make_snippet};

pub const DEFAULT_HF_ENDPOINT: &str = "https://router.huggingface.co/hf-inference/models";
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Configuration for the HF embedding backend.
#[derive(Clone)]
pub struct HfConfig {
    pub token: String,
    pub model: String,
    pub endpoint: String,
    /// Expected embedding dimension size.
    pub dim: usize,
    pub timeout_secs: u64,
}

impl HfConfig {
    /// Default model/endpoint with the given token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            model: DEFAULT_EMBEDDING_MODEL.into(),
            endpoint: DEFAULT_HF_ENDPOINT.into(),
            dim: DEFAULT_EMBEDDING_DIM,
            timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for HfConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfConfig")
            .field("token", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("dim", &self.dim)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// HF Inference embedding provider (async).
#[derive(Clone)]
pub struct HfEmbedder {
    client: reqwest::Client,
    url: String,
    model: String,
    dim: usize,
}

impl HfEmbedder {
    /// Construct a new embedder from configuration.
    ///
    /// # Errors
    /// `RagError::Config` for an empty token/model or an endpoint without
    /// http(s) scheme; `RagError::Http` if the client cannot be built.
    pub fn new(cfg: HfConfig) -> Result<Self, RagError> {
        if cfg.token.trim().is_empty() {
            return Err(RagError::Config("HF token is empty".into()));
        }
        if cfg.model.trim().is_empty() {
            return Err(RagError::Config("embedding model is empty".into()));
        }
        let endpoint = cfg.endpoint.trim().trim_end_matches('/');
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(RagError::Config(format!(
                "HF endpoint '{endpoint}' must start with http:// or https://"
            )));
        }
        if cfg.dim == 0 {
            return Err(RagError::Config("embedding dim must be > 0".into()));
        }

        let mut headers = header::HeaderMap::new();
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", cfg.token.trim()))
            .map_err(|e| RagError::Config(format!("invalid HF token header: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .default_headers(headers)
            .build()?;

        let url = format!(
            "{endpoint}/{}/pipeline/feature-extraction",
            cfg.model.trim()
        );

        Ok(Self {
            client,
            url,
            model: cfg.model,
            dim: cfg.dim,
        })
    }

    async fn request(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let started = Instant::now();
        debug!(model = %self.model, text_len = text.len(), "POST {}", self.url);

        let resp = self
            .client
            .post(&self.url)
            .json(&FeatureRequest { inputs: text })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let snippet = make_snippet(&resp.text().await.unwrap_or_default());
            error!(%status, url = %self.url, %snippet, "embedding request failed");
            return Err(RagError::HttpStatus {
                service: "hf-inference",
                status,
                url: self.url.clone(),
                snippet,
            });
        }

        let out: FeatureResponse = resp
            .json()
            .await
            .map_err(|e| RagError::Decode(format!("feature-extraction response: {e}")))?;
        let v = out.pooled()?;

        if v.len() != self.dim {
            return Err(RagError::VectorSizeMismatch {
                got: v.len(),
                want: self.dim,
            });
        }

        debug!(
            model = %self.model,
            latency_ms = started.elapsed().as_millis(),
            "embedding completed"
        );
        Ok(v)
    }
}

impl EmbeddingsProvider for HfEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Vec<f32>> {
        Box::pin(self.request(text))
    }

    fn dim(&self) -> usize {
        self.dim
    }
}

#[derive(Serialize)]
struct FeatureRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureResponse {
    Pooled(Vec<f32>),
    Tokens(Vec<Vec<f32>>),
    Batch(Vec<Vec<Vec<f32>>>),
}

impl FeatureResponse {
    fn pooled(self) -> Result<Vec<f32>, RagError> {
        match self {
            FeatureResponse::Pooled(v) => Ok(v),
            FeatureResponse::Tokens(rows) => mean_pool(rows),
            FeatureResponse::Batch(mut batch) => {
                if batch.is_empty() {
                    return Err(RagError::Decode("empty embedding batch".into()));
                }
                mean_pool(batch.swap_remove(0))
            }
        }
    }
}

fn mean_pool(rows: Vec<Vec<f32>>) -> Result<Vec<f32>, RagError> {
    let Some(width) = rows.first().map(Vec::len) else {
        return Err(RagError::Decode("empty token matrix".into()));
    };
    let mut acc = vec![0.0f32; width];
    for row in &rows {
        if row.len() != width {
            return Err(RagError::Decode("ragged token matrix".into()));
        }
        for (a, x) in acc.iter_mut().zip(row) {
            *a += x;
        }
    }
    let n = rows.len() as f32;
    acc.iter_mut().for_each(|a| *a /= n);
    Ok(acc)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, Router, extract::State, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    use super::*;

    async fn spawn(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/models")
    }

    fn cfg(endpoint: String, dim: usize) -> HfConfig {
        HfConfig {
            token: "hf_test".into(),
            model: "sentence-transformers/all-MiniLM-L6-v2".into(),
            endpoint,
            dim,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn posts_inputs_with_bearer_token() {
        let seen: Arc<Mutex<Option<(Value, String)>>> = Arc::default();
        let app = Router::new()
            .route(
                "/models/sentence-transformers/all-MiniLM-L6-v2/pipeline/feature-extraction",
                post(
                    |State(seen): State<Arc<Mutex<Option<(Value, String)>>>>,
                     headers: HeaderMap,
                     Json(body): Json<Value>| async move {
                        let auth = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or_default()
                            .to_string();
                        *seen.lock().unwrap() = Some((body, auth));
                        Json(json!([0.1, 0.2, 0.3]))
                    },
                ),
            )
            .with_state(seen.clone());
        let e = HfEmbedder::new(cfg(spawn(app).await, 3)).unwrap();

        let v = e.embed("What is RAG?").await.unwrap();
        assert_eq!(v, vec![0.1, 0.2, 0.3]);

        let (body, auth) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["inputs"], "What is RAG?");
        assert_eq!(auth, "Bearer hf_test");
    }

    #[tokio::test]
    async fn token_matrix_is_mean_pooled() {
        let app = Router::new().route(
            "/models/sentence-transformers/all-MiniLM-L6-v2/pipeline/feature-extraction",
            post(|| async { Json(json!([[1.0, 2.0], [3.0, 4.0]])) }),
        );
        let e = HfEmbedder::new(cfg(spawn(app).await, 2)).unwrap();
        assert_eq!(e.embed("x").await.unwrap(), vec![2.0, 3.0]);
    }

    #[tokio::test]
    async fn wrong_dimension_is_rejected() {
        let app = Router::new().route(
            "/models/sentence-transformers/all-MiniLM-L6-v2/pipeline/feature-extraction",
            post(|| async { Json(json!([0.5, 0.5])) }),
        );
        let e = HfEmbedder::new(cfg(spawn(app).await, 384)).unwrap();
        let err = e.embed("x").await.unwrap_err();
        assert!(matches!(
            err,
            RagError::VectorSizeMismatch { got: 2, want: 384 }
        ));
    }

    #[tokio::test]
    async fn non_success_status_is_typed() {
        let app = Router::new().route(
            "/models/sentence-transformers/all-MiniLM-L6-v2/pipeline/feature-extraction",
            post(|| async { (StatusCode::UNAUTHORIZED, "Invalid credentials in Authorization header") }),
        );
        let e = HfEmbedder::new(cfg(spawn(app).await, 384)).unwrap();
        match e.embed("x").await.unwrap_err() {
            RagError::HttpStatus { status, snippet, .. } => {
                assert_eq!(status, reqwest::StatusCode::UNAUTHORIZED);
                assert!(snippet.contains("Invalid credentials"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_token_is_a_config_error() {
        let mut c = cfg("https://router.huggingface.co/hf-inference/models".into(), 384);
        c.token = "  ".into();
        assert!(matches!(HfEmbedder::new(c), Err(RagError::Config(_))));
    }
}
