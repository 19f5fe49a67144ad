//! HTTP routes.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use mailbridge_core::{FetchOptions, handle_body};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared state for the fetch routes.
#[derive(Clone)]
pub struct AppState {
    /// Applied to every fetch.
    pub options: Arc<FetchOptions>,
}

/// POST /api/fetch-emails
///
/// The body is read as raw bytes so that a malformed body gets the JSON
/// error response instead of axum's plain-text rejection.
async fn fetch_emails(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let (status, response) = handle_body(&body, &state.options).await;
    let status = StatusCode::from_u16(status.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response))
}

/// GET /health
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Builds the service router.
pub fn router(options: FetchOptions) -> Router {
    let state = AppState {
        options: Arc::new(options),
    };

    Router::new()
        .route("/", post(fetch_emails))
        .route("/api/fetch-emails", post(fetch_emails))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
