//! Query embedding collaborator.
//!
//! Turning text into vectors is not this crate's job; it only needs a
//! [`QueryEmbedder`]. [`OllamaEmbedder`] talks to an Ollama-compatible
//! `/api/embeddings` endpoint so the CLI can run end to end.

use medrag_core::config::EmbedderConfig;
use medrag_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Trait for turning query text into an embedding vector.
#[async_trait::async_trait]
pub trait QueryEmbedder: Send + Sync {
    /// Model identifier, for logging.
    fn model_name(&self) -> &str;

    /// Embed a single query.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}

/// Request payload for the embeddings API
#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Response from the embeddings API
#[derive(Debug, Clone, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Error response from the embeddings API
#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Embedder backed by an Ollama-compatible HTTP endpoint.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    /// Create an embedder from configuration. No request is made until `embed`.
    pub fn new(config: &EmbedderConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait::async_trait]
impl QueryEmbedder for OllamaEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.model))]
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);
        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&EmbeddingRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|e| {
                AppError::UpstreamUnavailable(format!("Failed to reach embedder at {}: {}", url, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => "Unknown error".to_string(),
            };
            return Err(AppError::UpstreamUnavailable(format!(
                "Embedder error ({}): {}",
                status, message
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::UpstreamUnavailable(format!("Failed to parse embedding response: {}", e))
        })?;

        if body.embedding.is_empty() {
            return Err(AppError::UpstreamUnavailable(
                "Embedder returned an empty vector".to_string(),
            ));
        }

        Ok(body.embedding)
    }
}
