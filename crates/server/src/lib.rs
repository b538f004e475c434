//! Vector search HTTP server.
//!
//! # Endpoints
//!
//! - `POST /search` - Nearest-neighbor search for a batch of query vectors
//! - `GET /health` - Load status of the index and identifier table
//!
//! Resources are loaded once before the listener binds. A failed load does
//! not stop the server; `/search` then answers 500 until restart.

pub mod error;
pub mod routes;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use medrag_core::{AppConfig, AppError, AppResult};
use medrag_vector::{LoadedResources, VectorSearchService};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Debug)]
pub struct AppState {
    pub service: VectorSearchService,
}

impl AppState {
    pub fn new(service: VectorSearchService) -> Self {
        Self { service }
    }
}

/// Build the router over shared state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", post(routes::handle_search))
        .route("/health", get(routes::handle_health))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load resources, bind, and serve until Ctrl-C.
pub async fn serve(config: &AppConfig) -> AppResult<()> {
    let index_path = config.vector.index_path.clone();
    let mapping_path = config.vector.mapping_path.clone();
    let resources =
        tokio::task::spawn_blocking(move || LoadedResources::load(&index_path, &mapping_path))
            .await
            .map_err(|e| AppError::internal(format!("Resource loading task failed: {}", e)))?;

    if resources.index().is_none() {
        tracing::warn!("Serving without a vector index; /search will fail until restart");
    }

    let service = VectorSearchService::new(Arc::new(resources))
        .with_limits(config.vector.default_k, config.vector.max_k);
    let app = build_router(Arc::new(AppState::new(service)));

    let listener = tokio::net::TcpListener::bind(config.server.listen)
        .await
        .map_err(|e| {
            AppError::Config(format!("Failed to bind {}: {}", config.server.listen, e))
        })?;

    tracing::info!(address = %config.server.listen, "Vector search server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
