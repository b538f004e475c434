//! Request handlers.

use crate::error::ApiError;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use medrag_core::AppError;
use medrag_vector::SearchResponse;
use serde::Serialize;
use std::sync::Arc;

/// Handle POST /search
///
/// The body is taken raw so validation order and messages stay under the
/// service's control. Search runs on the blocking pool; a panic there becomes
/// a 500 instead of taking the worker down.
pub async fn handle_search(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let body = body.map_err(body_rejection)?;
    let state = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || state.service.handle(&body))
        .await
        .map_err(|e| AppError::internal(format!("Search task failed: {}", e)))?;

    Ok(Json(result?))
}

/// Body extraction failures keep the JSON error shape.
fn body_rejection(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!(
            "Request body exceeds {} bytes",
            crate::MAX_BODY_BYTES
        ))
    } else {
        AppError::bad_request(rejection.body_text())
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    index_loaded: bool,
    dimension: Option<usize>,
    ntotal: Option<usize>,
    mapped_ids: usize,
    version: &'static str,
}

/// Handle GET /health
pub async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.service.resources().status();
    Json(HealthResponse {
        status: if status.index_loaded { "ok" } else { "degraded" },
        index_loaded: status.index_loaded,
        dimension: status.dimension,
        ntotal: status.ntotal,
        mapped_ids: status.mapped_ids,
        version: env!("CARGO_PKG_VERSION"),
    })
}
