//! Health probe for the configured chat provider.
//!
//! Probe: `GET {endpoint}/models` with Bearer auth, best-effort check that the
//! configured model is listed. The returned [`HealthStatus`] is
//! JSON-serializable and suitable for a `/health` endpoint.
//! [`HealthService::check`] is resilient and never fails (errors mapped to
//! `ok=false`); [`HealthService::try_probe`] returns a strict `Result`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::llm_model_config::LlmModelConfig;
use crate::error_handler::{AiLlmError, HealthError, HttpError, make_snippet};

/// A serializable health snapshot for the chat provider.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Backend/provider (e.g., "Groq").
    pub provider: String,
    /// Target endpoint base URL.
    pub endpoint: String,
    /// Model the probe looked for.
    pub model: String,
    /// Overall health flag.
    pub ok: bool,
    /// Measured HTTP latency in milliseconds.
    pub latency_ms: u128,
    /// Short human-readable message with details.
    pub message: String,
}

impl HealthStatus {
    fn new(cfg: &LlmModelConfig, ok: bool, latency_ms: u128, message: impl Into<String>) -> Self {
        Self {
            provider: format!("{:?}", cfg.provider),
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            ok,
            latency_ms,
            message: message.into(),
        }
    }
}

/// Health checker that reuses a single HTTP client.
pub struct HealthService {
    client: reqwest::Client,
}

impl HealthService {
    /// Creates a new health service with an optional client timeout (seconds, default 10).
    ///
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the HTTP client cannot be built.
    pub fn new(timeout_secs: Option<u64>) -> Result<Self, AiLlmError> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(10));
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        debug!(timeout_secs = timeout.as_secs(), "HealthService initialized");
        Ok(Self { client })
    }

    /// Checks health for the given config. Never returns an error.
    pub async fn check(&self, cfg: &LlmModelConfig) -> HealthStatus {
        let start = Instant::now();
        match self.try_probe(cfg).await {
            Ok(status) => {
                info!(
                    provider = %status.provider,
                    model = %status.model,
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    "health probe completed"
                );
                status
            }
            Err(err) => {
                let status =
                    HealthStatus::new(cfg, false, start.elapsed().as_millis(), err.to_string());
                warn!(
                    provider = %status.provider,
                    endpoint = %status.endpoint,
                    message = %status.message,
                    "health probe failed"
                );
                status
            }
        }
    }

    /// Strict probe. Returns an error on hard failures (transport, non-2xx).
    pub async fn try_probe(&self, cfg: &LlmModelConfig) -> Result<HealthStatus, AiLlmError> {
        let endpoint = cfg.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(HealthError::InvalidEndpoint(cfg.endpoint.clone()).into());
        }
        let url = format!("{}/models", endpoint.trim_end_matches('/'));

        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", cfg.api_key.trim()))
            .map_err(|e| HealthError::Decode(format!("invalid API key header: {e}")))?;
        auth.set_sensitive(true);

        let start = Instant::now();
        debug!(provider = ?cfg.provider, model = %cfg.model, "GET {}", url);

        let resp = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, auth)
            .send()
            .await?;
        let latency = start.elapsed().as_millis();

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(HealthError::HttpStatus(HttpError {
                status,
                url,
                snippet: make_snippet(&text),
            })
            .into());
        }

        #[derive(Deserialize)]
        struct ModelItem {
            id: String,
        }
        #[derive(Deserialize)]
        struct Models {
            data: Vec<ModelItem>,
        }

        match resp.json::<Models>().await {
            Ok(models) if models.data.iter().any(|m| m.id == cfg.model) => Ok(HealthStatus::new(
                cfg,
                true,
                latency,
                "provider is healthy; model is available",
            )),
            Ok(_) => Ok(HealthStatus::new(
                cfg,
                false,
                latency,
                "provider is up, but model not found in /models",
            )),
            Err(e) => Ok(HealthStatus::new(
                cfg,
                true,
                latency,
                format!("provider is reachable; failed to decode /models: {e}"),
            )),
        }
    }
}
