use ai_llm_service::AiLlmError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contextor::ContextorError;
use rag_store::RagError;
use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::http::response_envelope::ApiResponse;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("initialization failed: {0}")]
    Rag(#[from] RagError),

    #[error("initialization failed: {0}")]
    Llm(#[from] AiLlmError),

    // --- IO / network / server ---
    #[error("failed to bind listener on {address}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    SessionBusy(&'static str),

    /// Retrieval or generation failed for one request.
    #[error("RAG error: {0}")]
    Answer(ContextorError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::SessionBusy(_) => StatusCode::CONFLICT,
            AppError::Answer(_) => StatusCode::BAD_GATEWAY,

            // startup-only
            AppError::Config(_)
            | AppError::Rag(_)
            | AppError::Llm(_)
            | AppError::Bind { .. }
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Rag(_) | AppError::Llm(_) => "INIT_FAILED",
            AppError::Bind { .. } => "BIND_ERROR",
            AppError::Server(_) => "SERVER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::SessionBusy(_) => "SESSION_BUSY",
            AppError::Answer(_) => "RAG_FAILED",
        }
    }
}

impl From<ContextorError> for AppError {
    fn from(err: ContextorError) -> Self {
        match err {
            ContextorError::EmptyQuestion => AppError::BadRequest(err.to_string()),
            other => AppError::Answer(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        ApiResponse::<()>::error(self.error_code(), self.to_string(), Vec::new())
            .into_response_with_status(status)
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;
