//! Retrieval result types.

use medrag_core::DocumentId;
use serde::{Deserialize, Serialize};

/// Retrieval channel that produced a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Vector,
    Lexical,
}

/// A retrieved document in the uniform record shape.
///
/// Vector hits carry only the identifier and distance; lexical hits carry
/// title and chunk text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub id: DocumentId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_chunked: Option<String>,

    pub channel: Channel,

    /// 1-based rank within the channel
    pub rank: usize,

    /// Index distance (vector channel only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f32>,
}

/// Per-channel results, each in its own order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChannelResults {
    pub vector: Vec<RetrievedDocument>,
    pub lexical: Vec<RetrievedDocument>,
}

impl ChannelResults {
    /// Vector hits followed by lexical hits; no re-ranking.
    pub fn into_documents(self) -> Vec<RetrievedDocument> {
        let mut docs = self.vector;
        docs.extend(self.lexical);
        docs
    }

    pub fn len(&self) -> usize {
        self.vector.len() + self.lexical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
