//! Hybrid retrieval over dense and lexical channels.
//!
//! [`HybridRetriever`] is the boundary object handed to the question-answering
//! layer through the [`Retriever`] trait.
//!
//! # Example
//! ```no_run
//! use medrag_core::AppConfig;
//! use medrag_lexical::LexicalSearchClient;
//! use medrag_retriever::{HybridRetriever, OllamaEmbedder, RemoteVectorSearch, Retriever};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> medrag_core::AppResult<()> {
//! let config = AppConfig::load()?;
//! let retriever = HybridRetriever::builder()
//!     .with_vector(
//!         Arc::new(OllamaEmbedder::new(&config.embedder)?),
//!         Arc::new(RemoteVectorSearch::new(&config.vector.service_url, Duration::from_secs(config.vector.timeout_secs))?),
//!     )
//!     .with_lexical(Arc::new(LexicalSearchClient::new(&config.lexical)?))
//!     .build()?;
//!
//! for doc in retriever.retrieve("paracetamol overdose").await? {
//!     println!("{:?} #{} {}", doc.channel, doc.rank, doc.id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod embedder;
pub mod hybrid;
pub mod types;
pub mod vector;

pub use embedder::{OllamaEmbedder, QueryEmbedder};
pub use hybrid::{HybridRetriever, HybridRetrieverBuilder, Retriever};
pub use types::{Channel, ChannelResults, RetrievedDocument};
pub use vector::{RemoteVectorSearch, VectorSearcher};
