//! Retrieve command handler.

use clap::Args;
use medrag_core::{config::AppConfig, AppError, AppResult};
use medrag_lexical::LexicalSearchClient;
use medrag_retriever::{
    Channel, HybridRetriever, OllamaEmbedder, RemoteVectorSearch, RetrievedDocument,
};
use std::sync::Arc;
use std::time::Duration;

/// Hybrid retrieval over both channels
#[derive(Args, Debug)]
pub struct RetrieveCommand {
    /// Free-text question
    pub query: String,

    /// Skip the vector channel
    #[arg(long)]
    pub no_vector: bool,

    /// Skip the lexical channel
    #[arg(long)]
    pub no_lexical: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl RetrieveCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        if self.no_vector && self.no_lexical {
            return Err(AppError::bad_request(
                "--no-vector and --no-lexical together leave nothing to query",
            ));
        }

        let mut builder = HybridRetriever::builder()
            .vector_k(config.vector.default_k)
            .lexical_k(config.lexical.default_k);

        if !self.no_vector {
            let embedder = OllamaEmbedder::new(&config.embedder)?;
            let searcher = RemoteVectorSearch::new(
                &config.vector.service_url,
                Duration::from_secs(config.vector.timeout_secs),
            )?;
            builder = builder.with_vector(Arc::new(embedder), Arc::new(searcher));
        }
        if !self.no_lexical {
            builder = builder.with_lexical(Arc::new(LexicalSearchClient::new(&config.lexical)?));
        }

        let retriever = builder.build()?;
        let results = retriever.retrieve_channels(&self.query).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }

        if results.is_empty() {
            println!("No documents retrieved.");
            return Ok(());
        }

        if !self.no_vector {
            println!("Vector ({} hits):", results.vector.len());
            for doc in &results.vector {
                print_document(doc);
            }
        }
        if !self.no_lexical {
            if !self.no_vector {
                println!();
            }
            println!("Lexical ({} hits):", results.lexical.len());
            for doc in &results.lexical {
                print_document(doc);
            }
        }

        Ok(())
    }
}

fn print_document(doc: &RetrievedDocument) {
    match doc.channel {
        Channel::Vector => println!(
            "  {}. {} (distance: {:.4})",
            doc.rank,
            doc.id,
            doc.distance.unwrap_or_default()
        ),
        Channel::Lexical => {
            let title = doc.title.as_deref().unwrap_or_default();
            println!("  {}. {} {}", doc.rank, doc.id, title);
            if let Some(text) = doc.text_chunked.as_deref().filter(|t| !t.is_empty()) {
                let preview: String = text.chars().take(160).collect();
                println!("     {}", preview.replace('\n', " "));
            }
        }
    }
}
