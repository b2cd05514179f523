//! One question/answer exchange within a session.

use std::sync::Arc;

use contextor::{AnswerGenerator, AskOptions, ContextorError, QaAnswer};
use tracing::{info, warn};

use crate::core::session::SessionContext;

pub const EMPTY_QUESTION_WARNING: &str = "Please enter a valid question.";
pub const BUSY_WARNING: &str =
    "A question is already being answered in this session. Please wait for it to finish.";

#[derive(Debug)]
pub enum Submission {
    Answered(QaAnswer),
    /// Blank input; nothing was sent.
    Rejected,
    /// The session is already answering.
    Busy,
    Failed(ContextorError),
}

/// Validates, marks the session as answering, and asks the generator.
///
/// The session returns to idle when this returns, on every path.
pub async fn submit_question(
    session: &Arc<SessionContext>,
    generator: &AnswerGenerator,
    question: &str,
    opts: AskOptions,
) -> Submission {
    if question.trim().is_empty() {
        return Submission::Rejected;
    }
    let Some(_answering) = session.try_begin_answering() else {
        warn!(session = %session.id(), "question rejected: session busy");
        return Submission::Busy;
    };

    match generator.answer_with(question, opts).await {
        Ok(qa) => {
            info!(
                session = %session.id(),
                sources = qa.source_documents.len(),
                "question answered"
            );
            Submission::Answered(qa)
        }
        Err(e) => {
            warn!(session = %session.id(), error = %e, "question failed");
            Submission::Failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ingest::ingest_once;
    use crate::core::session::InteractionState;
    use crate::test_support::{FlakyIndex, ScriptedLlm, llm_failure, state};

    #[tokio::test]
    async fn blank_question_is_rejected_without_calling_llm() {
        let llm = Arc::new(ScriptedLlm::new(vec![]));
        let app = state(Arc::new(FlakyIndex::new(0)), llm.clone());
        let (session, _) = app.sessions.get_or_create(None);

        let out = submit_question(&session, &app.generator, "   \n", AskOptions::default()).await;
        assert!(matches!(out, Submission::Rejected));
        assert_eq!(llm.calls(), 0);
        assert_eq!(session.state(), InteractionState::Idle);
    }

    #[tokio::test]
    async fn question_in_flight_makes_session_busy() {
        let llm = Arc::new(ScriptedLlm::new(vec![]));
        let app = state(Arc::new(FlakyIndex::new(0)), llm.clone());
        let (session, _) = app.sessions.get_or_create(None);

        let guard = session.try_begin_answering().unwrap();
        let out = submit_question(&session, &app.generator, "What is RAG?", AskOptions::default())
            .await;
        assert!(matches!(out, Submission::Busy));
        assert_eq!(llm.calls(), 0);
        drop(guard);
        assert_eq!(session.state(), InteractionState::Idle);
    }

    #[tokio::test]
    async fn failure_returns_session_to_idle_and_next_question_succeeds() {
        let llm = Arc::new(ScriptedLlm::new(vec![
            Err(llm_failure()),
            Ok("Pinecone is a vector database.".into()),
        ]));
        let app = state(Arc::new(FlakyIndex::new(0)), llm.clone());
        let (session, _) = app.sessions.get_or_create(None);
        ingest_once(&session, app.retriever(), app.corpus()).await;

        let first =
            submit_question(&session, &app.generator, "What is Pinecone?", AskOptions::default())
                .await;
        assert!(matches!(first, Submission::Failed(ContextorError::Llm(_))));
        assert_eq!(session.state(), InteractionState::Idle);

        let second =
            submit_question(&session, &app.generator, "What is Pinecone?", AskOptions::default())
                .await;
        let Submission::Answered(qa) = second else {
            panic!("expected an answer");
        };
        assert_eq!(qa.answer, "Pinecone is a vector database.");
        assert_eq!(qa.source_documents.len(), 4);
        assert!(qa.source_documents[0].content.contains("Pinecone"));
        assert_eq!(llm.calls(), 2);
    }

    #[tokio::test]
    async fn top_k_override_limits_sources() {
        let app = state(
            Arc::new(FlakyIndex::new(0)),
            Arc::new(ScriptedLlm::new(vec![])),
        );
        let (session, _) = app.sessions.get_or_create(None);
        ingest_once(&session, app.retriever(), app.corpus()).await;

        let out = submit_question(
            &session,
            &app.generator,
            "What is deep learning?",
            AskOptions { top_k: Some(2) },
        )
        .await;
        let Submission::Answered(qa) = out else {
            panic!("expected an answer");
        };
        assert_eq!(qa.source_documents.len(), 2);
    }
}
