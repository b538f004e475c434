//! Hybrid retrieval composition root.
//!
//! Fans a query out to the configured channels concurrently and hands back
//! each channel's hits in that channel's own order. Fusion and re-ranking are
//! left to the caller.

use crate::embedder::QueryEmbedder;
use crate::types::{Channel, ChannelResults, RetrievedDocument};
use crate::vector::VectorSearcher;
use medrag_core::{AppError, AppResult};
use medrag_lexical::LexicalSearcher;
use std::sync::Arc;

/// Retrieval contract handed to the orchestration layer.
#[async_trait::async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, query: &str) -> AppResult<Vec<RetrievedDocument>>;
}

struct VectorChannel {
    embedder: Arc<dyn QueryEmbedder>,
    searcher: Arc<dyn VectorSearcher>,
    k: usize,
}

impl VectorChannel {
    async fn retrieve(&self, query: &str) -> AppResult<Vec<RetrievedDocument>> {
        let embedding = self.embedder.embed(query).await?;
        tracing::debug!(
            model = self.embedder.model_name(),
            dimensions = embedding.len(),
            "Query embedded"
        );

        let response = self.searcher.search(vec![embedding], self.k).await?;
        let (Some(ids), Some(distances)) =
            (response.ids.into_iter().next(), response.distances.into_iter().next())
        else {
            return Err(AppError::internal("Vector search returned no result row"));
        };

        Ok(ids
            .into_iter()
            .zip(distances)
            .enumerate()
            .filter_map(|(slot, (id, distance))| {
                id.map(|id| RetrievedDocument {
                    id,
                    title: None,
                    text_chunked: None,
                    channel: Channel::Vector,
                    rank: slot + 1,
                    distance: Some(distance),
                })
            })
            .collect())
    }
}

struct LexicalChannel {
    searcher: Arc<dyn LexicalSearcher>,
    k: usize,
}

impl LexicalChannel {
    async fn retrieve(&self, query: &str) -> AppResult<Vec<RetrievedDocument>> {
        let results = self.searcher.retrieve(query, self.k).await?;
        Ok(results
            .into_documents()
            .into_iter()
            .enumerate()
            .map(|(i, doc)| RetrievedDocument {
                id: doc.id,
                title: Some(doc.title),
                text_chunked: Some(doc.text_chunked),
                channel: Channel::Lexical,
                rank: i + 1,
                distance: None,
            })
            .collect())
    }
}

/// Retriever over the vector and/or lexical channels.
pub struct HybridRetriever {
    vector: Option<VectorChannel>,
    lexical: Option<LexicalChannel>,
}

impl HybridRetriever {
    pub fn builder() -> HybridRetrieverBuilder {
        HybridRetrieverBuilder::default()
    }

    /// Retrieve from every configured channel, keeping results separate.
    ///
    /// Any channel failing fails the call; a silently missing channel would be
    /// indistinguishable from "nothing relevant".
    pub async fn retrieve_channels(&self, query: &str) -> AppResult<ChannelResults> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::bad_request("Query must not be empty"));
        }

        let vector = async {
            match &self.vector {
                Some(channel) => channel.retrieve(query).await,
                None => Ok(Vec::new()),
            }
        };
        let lexical = async {
            match &self.lexical {
                Some(channel) => channel.retrieve(query).await,
                None => Ok(Vec::new()),
            }
        };

        let (vector, lexical) = futures::future::try_join(vector, lexical).await?;
        tracing::info!(
            vector_hits = vector.len(),
            lexical_hits = lexical.len(),
            "Hybrid retrieval complete"
        );

        Ok(ChannelResults { vector, lexical })
    }
}

#[async_trait::async_trait]
impl Retriever for HybridRetriever {
    async fn retrieve(&self, query: &str) -> AppResult<Vec<RetrievedDocument>> {
        Ok(self.retrieve_channels(query).await?.into_documents())
    }
}

/// Builder for [`HybridRetriever`].
pub struct HybridRetrieverBuilder {
    vector: Option<(Arc<dyn QueryEmbedder>, Arc<dyn VectorSearcher>)>,
    lexical: Option<Arc<dyn LexicalSearcher>>,
    vector_k: usize,
    lexical_k: usize,
}

impl Default for HybridRetrieverBuilder {
    fn default() -> Self {
        Self {
            vector: None,
            lexical: None,
            vector_k: medrag_vector::service::DEFAULT_K,
            lexical_k: medrag_lexical::DEFAULT_K,
        }
    }
}

impl HybridRetrieverBuilder {
    /// Enable the vector channel.
    pub fn with_vector(
        mut self,
        embedder: Arc<dyn QueryEmbedder>,
        searcher: Arc<dyn VectorSearcher>,
    ) -> Self {
        self.vector = Some((embedder, searcher));
        self
    }

    /// Enable the lexical channel.
    pub fn with_lexical(mut self, searcher: Arc<dyn LexicalSearcher>) -> Self {
        self.lexical = Some(searcher);
        self
    }

    pub fn vector_k(mut self, k: usize) -> Self {
        self.vector_k = k;
        self
    }

    pub fn lexical_k(mut self, k: usize) -> Self {
        self.lexical_k = k;
        self
    }

    pub fn build(self) -> AppResult<HybridRetriever> {
        if self.vector.is_none() && self.lexical.is_none() {
            return Err(AppError::Config(
                "Hybrid retriever needs at least one channel".to_string(),
            ));
        }
        if self.vector_k == 0 || self.lexical_k == 0 {
            return Err(AppError::Config("Channel k must be positive".to_string()));
        }

        Ok(HybridRetriever {
            vector: self.vector.map(|(embedder, searcher)| VectorChannel {
                embedder,
                searcher,
                k: self.vector_k,
            }),
            lexical: self.lexical.map(|searcher| LexicalChannel {
                searcher,
                k: self.lexical_k,
            }),
        })
    }
}
