//! Offline fixtures: in-memory index, hashing embedder, scripted LLM.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ai_llm_service::error_handler::{ProviderError, ProviderErrorKind};
use ai_llm_service::{AiLlmError, LlmProvider};
use contextor::TextGenerator;
use rag_store::{
    BoxFuture, HashingEmbedder, HybridConfig, HybridPoint, HybridQuery, HybridRetriever,
    IndexSpec, MemoryIndex, RagError, ScoredDocument, VectorIndex, build_encoders, demo_corpus,
};

use crate::core::app_state::AppState;
use crate::core::session::SessionStore;

/// Replays scripted replies, then answers with a fixed text.
pub struct ScriptedLlm {
    replies: Mutex<Vec<Result<String, AiLlmError>>>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new(mut replies: Vec<Result<String, AiLlmError>>) -> Self {
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextGenerator for ScriptedLlm {
    fn generate<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String, AiLlmError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok("RAG combines retrieval with generation.".to_string()));
        Box::pin(async move { reply })
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

pub fn llm_failure() -> AiLlmError {
    ProviderError::new(LlmProvider::Groq, ProviderErrorKind::EmptyChoices).into()
}

/// Memory index that fails its first `failures` upserts.
pub struct FlakyIndex {
    inner: MemoryIndex,
    failures: AtomicUsize,
    upserts: AtomicUsize,
}

impl FlakyIndex {
    pub fn new(failures: usize) -> Self {
        let spec = IndexSpec::hybrid_default("us-east-1");
        Self {
            inner: MemoryIndex::new(&spec.name, spec.dimension),
            failures: AtomicUsize::new(failures),
            upserts: AtomicUsize::new(0),
        }
    }

    pub fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl VectorIndex for FlakyIndex {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn upsert<'a>(&'a self, points: Vec<HybridPoint>) -> BoxFuture<'a, usize> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        let fail = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail {
            return Box::pin(async { Err(RagError::Config("upsert refused".into())) });
        }
        self.inner.upsert(points)
    }

    fn query<'a>(&'a self, query: &'a HybridQuery) -> BoxFuture<'a, Vec<ScoredDocument>> {
        self.inner.query(query)
    }
}

pub fn retriever(index: Arc<FlakyIndex>) -> Arc<HybridRetriever> {
    let dim = IndexSpec::hybrid_default("us-east-1").dimension;
    let dense = Arc::new(HashingEmbedder::new(dim).unwrap());
    let encoders = build_encoders(dense, demo_corpus()).unwrap();
    Arc::new(HybridRetriever::new(index, encoders, HybridConfig::default()).unwrap())
}

/// App state over a flaky index and scripted LLM.
pub fn state(index: Arc<FlakyIndex>, llm: Arc<ScriptedLlm>) -> Arc<AppState> {
    AppState::with_generator(retriever(index), llm, None, SessionStore::new())
}
