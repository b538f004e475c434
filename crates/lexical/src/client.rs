//! Elasticsearch-backed lexical retrieval.
//!
//! Issues a single-field `match` query against `content` and normalizes
//! `hits.hits[]._source` into [`LexicalResults`], keeping the engine's order.

use crate::types::{LexicalDocument, LexicalResults};
use medrag_core::config::LexicalConfig;
use medrag_core::{AppError, AppResult};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Field the match query runs against.
pub const CONTENT_FIELD: &str = "content";

/// Fields projected from each hit.
pub const SOURCE_FIELDS: [&str; 3] = ["id", "title", "text_chunked"];

/// Hits requested when the caller does not choose.
pub const DEFAULT_K: usize = 10;

/// Trait for ranked full-text retrieval.
#[async_trait::async_trait]
pub trait LexicalSearcher: Send + Sync {
    /// Retrieve the top `k` documents for `query`, in engine rank order.
    async fn retrieve(&self, query: &str, k: usize) -> AppResult<LexicalResults>;
}

/// Elasticsearch `_search` response, reduced to what is read.
#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Value,
}

/// Lexical search client for an Elasticsearch-compatible engine.
#[derive(Debug, Clone)]
pub struct LexicalSearchClient {
    /// Engine base URL, without trailing slash
    base_url: String,

    /// Index queried on every call
    index: String,

    /// HTTP client (carries the round-trip timeout)
    client: reqwest::Client,
}

impl LexicalSearchClient {
    /// Create a client from configuration.
    pub fn new(config: &LexicalConfig) -> AppResult<Self> {
        Self::with_target(&config.url, &config.index, Duration::from_secs(config.timeout_secs))
    }

    /// Create a client for an explicit URL, index and timeout.
    pub fn with_target(base_url: &str, index: &str, timeout: Duration) -> AppResult<Self> {
        if index.trim().is_empty() {
            return Err(AppError::Config("Lexical index name must not be empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            index: index.to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    fn search_url(&self) -> String {
        format!("{}/{}/_search", self.base_url, self.index)
    }

    /// Build the request body for a ranked match query.
    pub fn build_query(query: &str, k: usize) -> Value {
        json!({
            "size": k,
            "query": {
                "match": {
                    CONTENT_FIELD: query
                }
            },
            "_source": SOURCE_FIELDS,
        })
    }

    /// Normalize a raw `_search` response body.
    fn parse_response(body: Value) -> AppResult<LexicalResults> {
        let response: SearchResponseBody = serde_json::from_value(body).map_err(|e| {
            AppError::UpstreamUnavailable(format!("Malformed search response: {}", e))
        })?;

        let docs = response
            .hits
            .hits
            .into_iter()
            .enumerate()
            .map(|(i, hit)| {
                serde_json::from_value::<LexicalDocument>(hit.source).map_err(|e| {
                    AppError::UpstreamUnavailable(format!("Malformed hit {}: {}", i + 1, e))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok(LexicalResults::new(docs))
    }
}

#[async_trait::async_trait]
impl LexicalSearcher for LexicalSearchClient {
    async fn retrieve(&self, query: &str, k: usize) -> AppResult<LexicalResults> {
        let url = self.search_url();
        tracing::info!(index = %self.index, k, "Sending lexical query");
        tracing::debug!(url = %url, query, "Lexical request");

        let response = self
            .client
            .post(&url)
            .json(&Self::build_query(query, k))
            .send()
            .await
            .map_err(|e| {
                AppError::UpstreamUnavailable(format!(
                    "Failed to reach lexical engine at {}: {}",
                    self.base_url, e
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamUnavailable(format!(
                "Lexical engine error ({}): {}",
                status, error_text
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            AppError::UpstreamUnavailable(format!("Failed to read lexical response: {}", e))
        })?;

        let results = Self::parse_response(body)?;
        tracing::info!(hits = results.len(), "Received lexical results");

        Ok(results)
    }
}
