//! Composition root: builds every long-lived component once.

use std::sync::Arc;
use std::time::Duration;

use ai_llm_service::LlmService;
use contextor::{AnswerGenerator, PromptTemplate, TextGenerator};
use rag_store::{
    EmbeddingsProvider, HfEmbedder, HybridRetriever, IndexManager, PineconeClient, QdrantDatabase,
    VectorDatabase, build_encoders, demo_corpus,
};
use tracing::{info, warn};

use crate::core::config::{AppConfig, VectorBackend};
use crate::core::ingest::SharedIngestion;
use crate::core::session::SessionStore;
use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub generator: AnswerGenerator,
    pub sessions: SessionStore,
    /// Ingestion shared by requests without a session cookie.
    pub shared_ingest: SharedIngestion,
    /// LLM service for `/health`; absent when a custom generator is wired in.
    pub llm: Option<Arc<LlmService>>,
}

impl AppState {
    /// Connects to the hosted services and prepares retrieval.
    ///
    /// Provisions the index if it does not exist yet (may create billable
    /// infrastructure) and fits the sparse encoder on the demo corpus.
    ///
    /// # Errors
    /// Any failure here is fatal for startup.
    pub async fn build(cfg: AppConfig) -> Result<Arc<Self>, AppError> {
        let db: Arc<dyn VectorDatabase> = match cfg.backend {
            VectorBackend::Pinecone(pc) => Arc::new(PineconeClient::new(pc)?),
            VectorBackend::Qdrant(qd) => Arc::new(QdrantDatabase::new(&qd)?),
        };
        let index = IndexManager::new(db, cfg.index)?.ensure_index().await?;

        let dense: Arc<dyn EmbeddingsProvider> = Arc::new(HfEmbedder::new(cfg.hf)?);
        let encoders = build_encoders(dense, demo_corpus())?;
        warn!(
            index = %index.name(),
            "sparse vectors already stored were encoded with the BM25 fit of their ingestion run; \
             each session re-ingests the corpus with the current fit"
        );

        let retriever = Arc::new(HybridRetriever::new(index, encoders, cfg.hybrid)?);
        let llm = Arc::new(LlmService::new(cfg.llm, Some(10))?);

        info!(
            index = %retriever.index_name(),
            model = %llm.config().model,
            top_k = retriever.config().top_k,
            alpha = retriever.config().alpha,
            "application state ready"
        );
        let sessions = SessionStore::with_ttl(Duration::from_secs(cfg.session_ttl_secs));
        Ok(Self::with_generator(retriever, llm.clone(), Some(llm), sessions))
    }

    /// Wires an already built retriever and text generator.
    pub fn with_generator(
        retriever: Arc<HybridRetriever>,
        generator: Arc<dyn TextGenerator>,
        llm: Option<Arc<LlmService>>,
        sessions: SessionStore,
    ) -> Arc<Self> {
        Arc::new(Self {
            generator: AnswerGenerator::new(retriever, generator, PromptTemplate::default()),
            sessions,
            shared_ingest: SharedIngestion::new(),
            llm,
        })
    }

    pub fn retriever(&self) -> &HybridRetriever {
        self.generator.retriever()
    }

    /// Corpus the sparse encoder was fitted on; also what ingestion upserts.
    pub fn corpus(&self) -> &[String] {
        &self.retriever().encoders().corpus
    }
}
