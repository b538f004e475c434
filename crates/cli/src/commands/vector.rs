//! Vector command handler.

use clap::Args;
use medrag_core::{config::AppConfig, AppError, AppResult};
use medrag_retriever::{RemoteVectorSearch, VectorSearcher};
use std::time::Duration;

/// Send a query batch to a running vector server
#[derive(Args, Debug)]
pub struct VectorCommand {
    /// Query batch as a JSON array of vectors, e.g. '[[0.1, 0.2, 0.3]]'
    #[arg(long)]
    pub queries: String,

    /// Neighbors per query (default: vector.default_k)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Server URL (overrides vector.service_url)
    #[arg(long)]
    pub url: Option<String>,
}

impl VectorCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let queries: Vec<Vec<f32>> = serde_json::from_str(&self.queries)
            .map_err(|e| AppError::bad_request(format!("Invalid --queries: {}", e)))?;
        let k = self.top_k.unwrap_or(config.vector.default_k);

        let client = RemoteVectorSearch::new(
            self.url.as_deref().unwrap_or(&config.vector.service_url),
            Duration::from_secs(config.vector.timeout_secs),
        )?;

        tracing::info!(url = client.base_url(), queries = queries.len(), k, "Sending query batch");

        let response = client.search(queries, k).await?;
        println!("{}", serde_json::to_string_pretty(&response)?);

        Ok(())
    }
}
