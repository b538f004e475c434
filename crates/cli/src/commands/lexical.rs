//! Lexical command handler.

use clap::Args;
use medrag_core::{config::AppConfig, AppResult};
use medrag_lexical::{LexicalSearchClient, LexicalSearcher};
use std::time::Duration;

/// Query the lexical engine
#[derive(Args, Debug)]
pub struct LexicalCommand {
    /// Free-text query
    pub query: String,

    /// Number of hits to request (default: lexical.default_k)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Engine URL (overrides lexical.url)
    #[arg(long)]
    pub url: Option<String>,

    /// Index name (overrides lexical.index)
    #[arg(long)]
    pub index: Option<String>,
}

impl LexicalCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let client = LexicalSearchClient::with_target(
            self.url.as_deref().unwrap_or(&config.lexical.url),
            self.index.as_deref().unwrap_or(&config.lexical.index),
            Duration::from_secs(config.lexical.timeout_secs),
        )?;
        let k = self.top_k.unwrap_or(config.lexical.default_k);

        tracing::info!(index = client.index(), k, "Executing lexical query");

        let results = client.retrieve(&self.query, k).await?;
        println!("{}", serde_json::to_string_pretty(&results)?);

        Ok(())
    }
}
