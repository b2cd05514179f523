//! Retrieval-augmented answer generation.

use std::sync::Arc;
use std::time::Instant;

use rag_store::HybridRetriever;
use tracing::{error, info, instrument};

use crate::api_types::{AskOptions, QaAnswer};
use crate::error::ContextorError;
use crate::llm::TextGenerator;
use crate::prompt::PromptTemplate;

/// Retriever + LLM + template.
pub struct AnswerGenerator {
    retriever: Arc<HybridRetriever>,
    llm: Arc<dyn TextGenerator>,
    template: PromptTemplate,
}

impl AnswerGenerator {
    pub fn new(
        retriever: Arc<HybridRetriever>,
        llm: Arc<dyn TextGenerator>,
        template: PromptTemplate,
    ) -> Self {
        Self {
            retriever,
            llm,
            template,
        }
    }

    pub fn retriever(&self) -> &Arc<HybridRetriever> {
        &self.retriever
    }

    /// Answers `question` with the configured default `top_k`.
    pub async fn answer(&self, question: &str) -> Result<QaAnswer, ContextorError> {
        self.answer_with(question, AskOptions::default()).await
    }

    /// Retrieves, renders the prompt, generates.
    ///
    /// # Errors
    /// - [`ContextorError::EmptyQuestion`] for blank input
    /// - [`ContextorError::Rag`] if retrieval fails
    /// - [`ContextorError::Llm`] if generation fails
    /// - [`ContextorError::EmptyAnswer`] if the completion is blank
    #[instrument(skip_all, fields(model = %self.llm.model(), question_len = question.len()))]
    pub async fn answer_with(
        &self,
        question: &str,
        opts: AskOptions,
    ) -> Result<QaAnswer, ContextorError> {
        // Blank input is rejected; otherwise the question is used as typed.
        if question.trim().is_empty() {
            return Err(ContextorError::EmptyQuestion);
        }
        let started = Instant::now();
        let k = opts.top_k.unwrap_or(self.retriever.config().top_k);

        let docs = self.retriever.retrieve(question, k).await.map_err(|e| {
            error!(error = %e, "retrieval failed");
            ContextorError::from(e)
        })?;

        let prompt = self.template.render(&docs, question);
        let answer = self.llm.generate(&prompt).await.map_err(|e| {
            error!(error = %e, "generation failed");
            ContextorError::from(e)
        })?;
        if answer.trim().is_empty() {
            return Err(ContextorError::EmptyAnswer);
        }

        info!(
            k,
            sources = docs.len(),
            prompt_len = prompt.len(),
            latency_ms = started.elapsed().as_millis(),
            "answer generated"
        );
        Ok(QaAnswer {
            answer: answer.trim().to_string(),
            source_documents: docs,
        })
    }
}
