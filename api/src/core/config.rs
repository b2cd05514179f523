//! Application configuration from environment variables.
//!
//! Exactly three credentials are required: the vector-DB key, the embedding
//! token and the LLM key. Which variable carries each depends on
//! `VECTOR_BACKEND` and `LLM_PROVIDER`. Every missing one is reported at once.

use std::str::FromStr;

use ai_llm_service::error_handler::{opt_env, process_env};
use ai_llm_service::{AiLlmError, LlmModelConfig, config_chat_from, provider_from};
use rag_store::{
    DEFAULT_EMBEDDING_DIM, DEFAULT_EMBEDDING_MODEL, DEFAULT_HF_ENDPOINT, HfConfig, HybridConfig,
    IndexSpec, Metric, PineconeConfig, QdrantConfig, RagError, ServerlessSpec,
};
use thiserror::Error;

pub const DEFAULT_ADDRESS: &str = "127.0.0.1:8501";
pub const DEFAULT_INDEX_NAME: &str = "hybrid-search-index";
pub const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingCredentials(Vec<&'static str>),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error(transparent)]
    Rag(#[from] RagError),
}

/// Hosted vector database selected by `VECTOR_BACKEND`.
#[derive(Clone, Debug)]
pub enum VectorBackend {
    Pinecone(PineconeConfig),
    Qdrant(QdrantConfig),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub backend: VectorBackend,
    pub index: IndexSpec,
    pub hf: HfConfig,
    pub llm: LlmModelConfig,
    pub hybrid: HybridConfig,
    pub address: String,
    /// Idle time after which a session is evicted.
    pub session_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(&process_env)
    }

    /// Builds the config from an arbitrary variable source.
    ///
    /// # Errors
    /// - [`ConfigError::MissingCredentials`] listing every absent credential
    /// - [`ConfigError::Invalid`] for malformed optional values
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend_name = opt_env(lookup, "VECTOR_BACKEND").unwrap_or_else(|| "pinecone".into());
        let (is_pinecone, backend_vars): (bool, &[&'static str]) =
            match backend_name.trim().to_ascii_lowercase().as_str() {
                "pinecone" => (true, &["PINECONE_API_KEY"][..]),
                "qdrant" => (false, &["QDRANT_URL", "QDRANT_API_KEY"][..]),
                other => {
                    return Err(ConfigError::Invalid {
                        var: "VECTOR_BACKEND",
                        reason: format!(
                            "unsupported backend '{other}' (expected pinecone or qdrant)"
                        ),
                    });
                }
            };
        let provider = provider_from(lookup)?;

        let missing: Vec<&'static str> = backend_vars
            .iter()
            .copied()
            .chain(["HF_TOKEN", provider.api_key_var()])
            .filter(|var| opt_env(lookup, var).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingCredentials(missing));
        }
        let required = |var: &'static str| opt_env(lookup, var).unwrap_or_default();

        let backend = if is_pinecone {
            VectorBackend::Pinecone(PineconeConfig::with_api_key(required("PINECONE_API_KEY")))
        } else {
            VectorBackend::Qdrant(QdrantConfig {
                url: required("QDRANT_URL"),
                api_key: Some(required("QDRANT_API_KEY")),
            })
        };

        let hf = HfConfig {
            token: required("HF_TOKEN"),
            model: opt_env(lookup, "EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.into()),
            endpoint: opt_env(lookup, "HF_INFERENCE_URL")
                .unwrap_or_else(|| DEFAULT_HF_ENDPOINT.into()),
            dim: DEFAULT_EMBEDDING_DIM,
            timeout_secs: 30,
        };

        let index = IndexSpec {
            name: opt_env(lookup, "INDEX_NAME").unwrap_or_else(|| DEFAULT_INDEX_NAME.into()),
            dimension: hf.dim,
            metric: Metric::DotProduct,
            serverless: ServerlessSpec {
                cloud: opt_env(lookup, "PINECONE_CLOUD").unwrap_or_else(|| "aws".into()),
                region: opt_env(lookup, "PINECONE_REGION").unwrap_or_else(|| "us-east-1".into()),
            },
        };
        index.validate()?;

        let defaults = HybridConfig::default();
        let hybrid = HybridConfig {
            top_k: parse_or(lookup, "RAG_TOP_K", defaults.top_k)?,
            alpha: parse_or(lookup, "HYBRID_ALPHA", defaults.alpha)?,
            ..defaults
        };
        hybrid.validate()?;

        Ok(Self {
            backend,
            index,
            hf,
            llm: config_chat_from(lookup)?,
            hybrid,
            address: opt_env(lookup, "API_ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.into()),
            session_ttl_secs: parse_or(lookup, "SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match opt_env(lookup, var) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    const KEYS: [(&str, &str); 3] = [
        ("PINECONE_API_KEY", "pc"),
        ("HF_TOKEN", "hf"),
        ("GROQ_API_KEY", "gsk"),
    ];

    #[test]
    fn defaults_with_three_credentials() {
        let cfg = AppConfig::from_lookup(&env(&KEYS)).unwrap();
        assert!(matches!(cfg.backend, VectorBackend::Pinecone(_)));
        assert_eq!(cfg.index.name, "hybrid-search-index");
        assert_eq!(cfg.index.dimension, 384);
        assert_eq!(cfg.index.metric, Metric::DotProduct);
        assert_eq!(cfg.index.serverless.region, "us-east-1");
        assert_eq!(cfg.hybrid.top_k, 4);
        assert_eq!(cfg.hybrid.alpha, 0.5);
        assert_eq!(cfg.llm.model, "llama3-8b-8192");
        assert_eq!(cfg.hf.model, "sentence-transformers/all-MiniLM-L6-v2");
        assert_eq!(cfg.address, DEFAULT_ADDRESS);
        assert_eq!(cfg.session_ttl_secs, DEFAULT_SESSION_TTL_SECS);
    }

    #[test]
    fn every_missing_credential_is_reported() {
        match AppConfig::from_lookup(&env(&[("HF_TOKEN", "hf")])) {
            Err(ConfigError::MissingCredentials(vars)) => {
                assert_eq!(vars, vec!["PINECONE_API_KEY", "GROQ_API_KEY"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
        let err = AppConfig::from_lookup(&env(&[])).unwrap_err();
        assert!(err.to_string().contains("PINECONE_API_KEY, HF_TOKEN, GROQ_API_KEY"));
    }

    #[test]
    fn qdrant_backend_needs_url_and_key() {
        let lookup = env(&[
            ("VECTOR_BACKEND", "qdrant"),
            ("QDRANT_URL", "https://example.cloud.qdrant.io:6334"),
            ("HF_TOKEN", "hf"),
            ("GROQ_API_KEY", "gsk"),
        ]);
        match AppConfig::from_lookup(&lookup) {
            Err(ConfigError::MissingCredentials(vars)) => assert_eq!(vars, vec!["QDRANT_API_KEY"]),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn region_and_knobs_are_read() {
        let mut pairs = KEYS.to_vec();
        pairs.extend([
            ("PINECONE_REGION", "eu-west-1"),
            ("RAG_TOP_K", "2"),
            ("HYBRID_ALPHA", "0.8"),
            ("API_ADDRESS", "0.0.0.0:9000"),
            ("SESSION_TTL_SECS", "60"),
        ]);
        let cfg = AppConfig::from_lookup(&env(&pairs)).unwrap();
        assert_eq!(cfg.index.serverless.region, "eu-west-1");
        assert_eq!(cfg.hybrid.top_k, 2);
        assert_eq!(cfg.hybrid.alpha, 0.8);
        assert_eq!(cfg.address, "0.0.0.0:9000");
        assert_eq!(cfg.session_ttl_secs, 60);
    }

    #[test]
    fn malformed_optional_values_are_fatal() {
        let mut pairs = KEYS.to_vec();
        pairs.push(("RAG_TOP_K", "four"));
        assert!(matches!(
            AppConfig::from_lookup(&env(&pairs)),
            Err(ConfigError::Invalid { var: "RAG_TOP_K", .. })
        ));

        let mut pairs = KEYS.to_vec();
        pairs.push(("HYBRID_ALPHA", "1.5"));
        assert!(matches!(
            AppConfig::from_lookup(&env(&pairs)),
            Err(ConfigError::Rag(RagError::Config(_)))
        ));

        let mut pairs = KEYS.to_vec();
        pairs.push(("VECTOR_BACKEND", "weaviate"));
        assert!(matches!(
            AppConfig::from_lookup(&env(&pairs)),
            Err(ConfigError::Invalid { var: "VECTOR_BACKEND", .. })
        ));
    }
}
