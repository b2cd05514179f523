//! POST /api/ask: JSON twin of the chat form.

use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use contextor::AskOptions;
use rag_store::validate_top_k;

use crate::{
    core::{
        app_state::AppState,
        http::response_envelope::ApiResponse,
        ingest::ingest_once,
        interaction::{BUSY_WARNING, EMPTY_QUESTION_WARNING, Submission, submit_question},
        session::{SessionContext, attach_session_cookie, session_id_from_headers},
    },
    error_handler::{AppError, AppResult},
    routes::ask::ask_request::AskRequest,
};

/// Handler: POST /api/ask
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8501/api/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is Pinecone?","top_k":2}'
/// ```
pub async fn ask_question(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AskRequest>,
) -> AppResult<Response> {
    if let Some(k) = body.top_k {
        validate_top_k(k).map_err(|e| AppError::BadRequest(e.to_string()))?;
    }

    // Cookie-less callers share one ingestion and get a throwaway context.
    let (session, created) = match session_id_from_headers(&headers) {
        Some(id) => {
            let (session, created) = state.sessions.get_or_create(Some(id));
            ingest_once(&session, state.retriever(), state.corpus()).await;
            (session, created)
        }
        None => {
            state
                .shared_ingest
                .ingest_once(state.retriever(), state.corpus())
                .await;
            (SessionContext::detached(), false)
        }
    };

    let opts = AskOptions { top_k: body.top_k };
    let qa = match submit_question(&session, &state.generator, &body.question, opts).await {
        Submission::Answered(qa) => qa,
        Submission::Rejected => return Err(AppError::BadRequest(EMPTY_QUESTION_WARNING.into())),
        Submission::Busy => return Err(AppError::SessionBusy(BUSY_WARNING)),
        Submission::Failed(e) => return Err(e.into()),
    };

    let resp = Json(ApiResponse::success(qa)).into_response();
    Ok(attach_session_cookie(resp, &session, created))
}
