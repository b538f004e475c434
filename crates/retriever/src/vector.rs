//! Vector search channel: in-process service or remote `/search` server.

use medrag_core::{AppError, AppResult};
use medrag_vector::{SearchRequest, SearchResponse, VectorSearchService};
use serde::Deserialize;
use std::time::Duration;

/// Trait for executing vector query batches.
#[async_trait::async_trait]
pub trait VectorSearcher: Send + Sync {
    async fn search(&self, queries: Vec<Vec<f32>>, k: usize) -> AppResult<SearchResponse>;
}

#[async_trait::async_trait]
impl VectorSearcher for VectorSearchService {
    async fn search(&self, queries: Vec<Vec<f32>>, k: usize) -> AppResult<SearchResponse> {
        let service = self.clone();
        tokio::task::spawn_blocking(move || VectorSearchService::search(&service, &queries, k))
            .await
            .map_err(|e| AppError::internal(format!("Vector search task failed: {}", e)))?
    }
}

/// Error body returned by the vector server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for a vector search server speaking `POST /search`.
#[derive(Debug, Clone)]
pub struct RemoteVectorSearch {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteVectorSearch {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl VectorSearcher for RemoteVectorSearch {
    async fn search(&self, queries: Vec<Vec<f32>>, k: usize) -> AppResult<SearchResponse> {
        let url = format!("{}/search", self.base_url);
        tracing::debug!(url = %url, queries = queries.len(), k, "Sending vector search");

        let response = self
            .client
            .post(&url)
            .json(&SearchRequest::new(queries, k))
            .send()
            .await
            .map_err(|e| {
                AppError::UpstreamUnavailable(format!(
                    "Failed to reach vector server at {}: {}",
                    self.base_url, e
                ))
            })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<SearchResponse>().await.map_err(|e| {
                AppError::UpstreamUnavailable(format!("Malformed vector response: {}", e))
            });
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => format!("Vector server returned {}", status),
        };

        Err(match status.as_u16() {
            400 => AppError::BadRequest(message),
            500 if message == medrag_vector::service::INDEX_NOT_LOADED => {
                AppError::ServiceUnavailable(message)
            }
            500 => AppError::Internal(message),
            _ => AppError::UpstreamUnavailable(format!("Vector server error ({}): {}", status, message)),
        })
    }
}
