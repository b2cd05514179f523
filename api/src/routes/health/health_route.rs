//! GET /health: liveness plus LLM reachability.

use std::sync::Arc;

use ai_llm_service::HealthStatus;
use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::{app_state::AppState, http::response_envelope::ApiResponse};

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub index: String,
    pub sessions: usize,
    /// `None` when no hosted LLM is wired in.
    pub llm: Option<HealthStatus>,
}

/// Handler: GET /health
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthReport>> {
    let llm = match &state.llm {
        Some(svc) => Some(svc.health().await),
        None => None,
    };
    Json(ApiResponse::success(HealthReport {
        index: state.retriever().index_name().to_string(),
        sessions: state.sessions.len(),
        llm,
    }))
}
