//! Once-per-session ingestion of the demo corpus.

use rag_store::HybridRetriever;
use tracing::{info, warn};

use crate::core::session::SessionContext;

pub const INGESTED_NOTICE: &str = "AI documents indexed into the vector index.";

#[derive(Debug, PartialEq)]
pub enum IngestOutcome {
    /// This call ingested `n` documents.
    Ingested(usize),
    /// An earlier call in the session already did.
    AlreadyIngested,
    /// Ingestion failed; the next request in the session retries.
    Failed(String),
}

impl IngestOutcome {
    /// Warning text for the page, if any.
    pub fn warning(&self) -> Option<String> {
        match self {
            IngestOutcome::Failed(e) => Some(format!("Ingestion failed: {e}")),
            _ => None,
        }
    }
}

/// Upserts `corpus` unless this session already did.
///
/// The session's ingestion lock is held for the whole upsert, so concurrent
/// first requests of one session wait and then observe the flag.
pub async fn ingest_once(
    session: &SessionContext,
    retriever: &HybridRetriever,
    corpus: &[String],
) -> IngestOutcome {
    let scope = session.id().to_string();
    ingest_guarded(&session.ingested, &scope, retriever, corpus).await
}

/// Process-wide ingestion for requests that carry no session.
#[derive(Default)]
pub struct SharedIngestion {
    done: tokio::sync::Mutex<bool>,
}

impl SharedIngestion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts `corpus` once for all session-less requests; retried after a failure.
    pub async fn ingest_once(&self, retriever: &HybridRetriever, corpus: &[String]) -> IngestOutcome {
        ingest_guarded(&self.done, "shared", retriever, corpus).await
    }
}

async fn ingest_guarded(
    flag: &tokio::sync::Mutex<bool>,
    scope: &str,
    retriever: &HybridRetriever,
    corpus: &[String],
) -> IngestOutcome {
    let mut done = flag.lock().await;
    if *done {
        return IngestOutcome::AlreadyIngested;
    }
    match retriever.add_documents(corpus).await {
        Ok(n) => {
            *done = true;
            info!(session = %scope, upserted = n, "corpus ingested");
            IngestOutcome::Ingested(n)
        }
        Err(e) => {
            warn!(session = %scope, error = %e, "ingestion failed");
            IngestOutcome::Failed(e.to_string())
        }
    }
}
