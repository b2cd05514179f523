//! GET/POST /: the chat form.

use std::sync::Arc;

use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use contextor::AskOptions;

use crate::{
    core::{
        app_state::AppState,
        ingest::{INGESTED_NOTICE, IngestOutcome, ingest_once},
        interaction::{BUSY_WARNING, EMPTY_QUESTION_WARNING, Submission, submit_question},
        session::{SessionContext, attach_session_cookie, session_id_from_headers},
    },
    routes::chat::{
        chat_form::ChatForm,
        chat_view::{DEFAULT_QUESTION, PageView, render_page},
    },
};

/// Handler: GET /
pub async fn chat_page(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let (session, created) = state.sessions.get_or_create(session_id_from_headers(&headers));
    let mut view = PageView::new(DEFAULT_QUESTION);
    ingest_into_view(&state, &session, &mut view).await;
    respond(&view, &session, created)
}

/// Handler: POST /
pub async fn chat_submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<ChatForm>,
) -> Response {
    let (session, created) = state.sessions.get_or_create(session_id_from_headers(&headers));
    let mut view = PageView::new(form.question.clone());
    ingest_into_view(&state, &session, &mut view).await;

    match submit_question(&session, &state.generator, &form.question, AskOptions::default()).await
    {
        Submission::Answered(qa) => view.answer = Some(qa),
        Submission::Rejected => view.warnings.push(EMPTY_QUESTION_WARNING.to_string()),
        Submission::Busy => view.warnings.push(BUSY_WARNING.to_string()),
        Submission::Failed(e) => view.error = Some(format!("RAG error: {e}")),
    }
    respond(&view, &session, created)
}

async fn ingest_into_view(state: &AppState, session: &SessionContext, view: &mut PageView) {
    let outcome = ingest_once(session, state.retriever(), state.corpus()).await;
    if let IngestOutcome::Ingested(_) = outcome {
        view.notice = Some(INGESTED_NOTICE.to_string());
    }
    if let Some(w) = outcome.warning() {
        view.warnings.push(w);
    }
}

fn respond(view: &PageView, session: &SessionContext, created: bool) -> Response {
    let resp = Html(render_page(view)).into_response();
    attach_session_cookie(resp, session, created)
}
