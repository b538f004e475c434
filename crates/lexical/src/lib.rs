//! Sparse lexical retrieval over an external full-text engine.
//!
//! The client is stateless apart from its connection pool: each call is one
//! HTTP round trip, and a failed round trip is an error, never an empty result.
//!
//! # Example
//! ```no_run
//! use medrag_core::config::LexicalConfig;
//! use medrag_lexical::{LexicalSearchClient, LexicalSearcher};
//!
//! # async fn example() -> medrag_core::AppResult<()> {
//! let client = LexicalSearchClient::new(&LexicalConfig::default())?;
//! let results = client.retrieve("paracetamol", 10).await?;
//! for (key, doc) in results.iter() {
//!     println!("{}: {}", key, doc.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod types;

pub use client::{LexicalSearchClient, LexicalSearcher, DEFAULT_K};
pub use types::{LexicalDocument, LexicalResults};
