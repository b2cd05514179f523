//! HTTP surface: the chat page, a JSON ask endpoint and a health probe.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

pub mod core;
mod error_handler;
mod middleware_layer;
mod routes;

#[cfg(test)]
mod test_support;

pub use crate::core::app_state::AppState;
pub use crate::core::config::{AppConfig, ConfigError, VectorBackend};
pub use error_handler::{AppError, AppResult};

use crate::middleware_layer::json_extractor::json_error_mapper;
use crate::routes::{
    ask::ask_question_route::ask_question,
    chat::chat_page_route::{chat_page, chat_submit},
    health::health_route::health,
};

/// All routes bound to `state`.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/ask", post(ask_question))
        .layer(middleware::from_fn(json_error_mapper));

    Router::new()
        .route("/", get(chat_page).post(chat_submit))
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
}

/// Serves until Ctrl+C.
///
/// # Errors
/// [`AppError::Bind`] if `address` cannot be bound, [`AppError::Server`] if
/// serving fails.
pub async fn start(state: Arc<AppState>, address: &str) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|source| AppError::Bind {
            address: address.to_string(),
            source,
        })?;
    info!(%address, "listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::core::session::SESSION_COOKIE;
    use crate::test_support::{FlakyIndex, ScriptedLlm, state};

    fn app() -> (Arc<AppState>, Router) {
        let st = state(
            Arc::new(FlakyIndex::new(0)),
            Arc::new(ScriptedLlm::new(vec![])),
        );
        (st.clone(), router(st))
    }

    async fn body_text(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), 1 << 20).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn set_cookie(resp: &Response) -> Option<String> {
        resp.headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    #[tokio::test]
    async fn get_root_renders_form_and_sets_cookie() {
        let (_, app) = app();
        let resp = app
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = set_cookie(&resp).unwrap();
        assert!(cookie.starts_with(&format!("{SESSION_COOKIE}=")));

        let html = body_text(resp).await;
        assert!(html.contains("RAG Chatbot with Hybrid Search"));
        assert!(html.contains(crate::core::ingest::INGESTED_NOTICE));
        assert!(html.contains("What is RAG in AI?"));
    }

    #[tokio::test]
    async fn returning_session_is_not_reingested() {
        let (st, app) = app();
        let first = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let cookie = set_cookie(&first).unwrap();
        let pair = cookie.split(';').next().unwrap().to_string();

        let second = app
            .oneshot(
                Request::get("/")
                    .header(header::COOKIE, pair)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(set_cookie(&second).is_none());
        let html = body_text(second).await;
        assert!(!html.contains(crate::core::ingest::INGESTED_NOTICE));
        assert_eq!(st.sessions.len(), 1);
    }

    #[tokio::test]
    async fn posting_blank_question_shows_warning() {
        let (_, app) = app();
        let resp = app
            .oneshot(
                Request::post("/")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("question=+++"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let html = body_text(resp).await;
        assert!(html.contains(crate::core::interaction::EMPTY_QUESTION_WARNING));
        assert!(!html.contains("Source Documents"));
    }

    #[tokio::test]
    async fn posting_question_renders_answer_and_sources() {
        let (_, app) = app();
        let resp = app
            .oneshot(
                Request::post("/")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("question=What+is+Pinecone%3F"))
                    .unwrap(),
            )
            .await
            .unwrap();
        let html = body_text(resp).await;
        assert!(html.contains("RAG combines retrieval with generation."));
        assert!(html.contains("<summary>Source Documents</summary>"));
        assert_eq!(html.matches("<li>").count(), 4);
        assert!(html.contains("value=\"What is Pinecone?\""));
    }

    #[tokio::test]
    async fn api_ask_returns_envelope() {
        let (_, app) = app();
        let resp = app
            .oneshot(
                Request::post("/api/ask")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"question":"What is RAG in AI?","top_k":2}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(set_cookie(&resp).is_none());
        let v: Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["data"]["answer"], "RAG combines retrieval with generation.");
        assert_eq!(v["data"]["source_documents"].as_array().unwrap().len(), 2);
        assert!(v["error"].is_null());
    }

    fn ask_request(body: &'static str, cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::post("/api/ask").header(header::CONTENT_TYPE, "application/json");
        if let Some(c) = cookie {
            req = req.header(header::COOKIE, c);
        }
        req.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn cookieless_api_calls_share_one_ingestion_and_keep_no_sessions() {
        let index = Arc::new(FlakyIndex::new(0));
        let st = state(index.clone(), Arc::new(ScriptedLlm::new(vec![])));
        let app = router(st.clone());

        for _ in 0..5 {
            let resp = app
                .clone()
                .oneshot(ask_request(r#"{"question":"What is Pinecone?"}"#, None))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }
        assert_eq!(st.sessions.len(), 0);
        assert_eq!(index.upserts(), 1);
    }

    #[tokio::test]
    async fn api_ask_with_cookie_reuses_the_page_session() {
        let index = Arc::new(FlakyIndex::new(0));
        let st = state(index.clone(), Arc::new(ScriptedLlm::new(vec![])));
        let app = router(st.clone());

        let page = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let cookie = set_cookie(&page).unwrap();
        let pair = cookie.split(';').next().unwrap().to_string();

        let resp = app
            .oneshot(ask_request(r#"{"question":"What is RAG?"}"#, Some(&pair)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(set_cookie(&resp).is_none());
        assert_eq!(st.sessions.len(), 1);
        assert_eq!(index.upserts(), 1);
    }

    #[tokio::test]
    async fn api_ask_rejects_out_of_range_top_k() {
        let (_, app) = app();
        let resp = app
            .oneshot(ask_request(r#"{"question":"What is RAG?","top_k":10001}"#, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let v: Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(v["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn api_ask_rejects_blank_question() {
        let (_, app) = app();
        let resp = app
            .oneshot(
                Request::post("/api/ask")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"question":"  "}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let v: Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"]["code"], "BAD_REQUEST");
        assert_eq!(
            v["error"]["message"],
            crate::core::interaction::EMPTY_QUESTION_WARNING
        );
    }

    #[tokio::test]
    async fn api_ask_malformed_json_is_enveloped() {
        let (_, app) = app();
        let resp = app
            .oneshot(
                Request::post("/api/ask")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"top_k":2}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let v: Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"]["details"][0]["path"], "question");
    }

    #[tokio::test]
    async fn health_reports_index_without_llm() {
        let (_, app) = app();
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let v: Value = serde_json::from_str(&body_text(resp).await).unwrap();
        assert_eq!(v["data"]["index"], "hybrid-search-index");
        assert!(v["data"]["llm"].is_null());
    }
}
