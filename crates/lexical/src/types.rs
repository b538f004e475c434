//! Lexical retrieval types.

use medrag_core::DocumentId;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// A document hit from the full-text engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalDocument {
    pub id: DocumentId,

    #[serde(default)]
    pub title: String,

    /// Chunked body text
    #[serde(default)]
    pub text_chunked: String,
}

/// Hits in the engine's rank order, keyed `doc1..docN`.
///
/// Serializes as a JSON object whose keys follow rank order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LexicalResults {
    docs: Vec<LexicalDocument>,
}

impl LexicalResults {
    pub fn new(docs: Vec<LexicalDocument>) -> Self {
        Self { docs }
    }

    /// Rank key for a zero-based position.
    pub fn rank_key(position: usize) -> String {
        format!("doc{}", position + 1)
    }

    /// Look up a document by rank key (`"doc1"`, `"doc2"`, ...).
    pub fn get(&self, key: &str) -> Option<&LexicalDocument> {
        let rank: usize = key.strip_prefix("doc")?.parse().ok()?;
        rank.checked_sub(1).and_then(|i| self.docs.get(i))
    }

    /// `(rank key, document)` pairs in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (String, &LexicalDocument)> {
        self.docs
            .iter()
            .enumerate()
            .map(|(i, doc)| (Self::rank_key(i), doc))
    }

    pub fn into_documents(self) -> Vec<LexicalDocument> {
        self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl Serialize for LexicalResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.docs.len()))?;
        for (key, doc) in self.iter() {
            map.serialize_entry(&key, doc)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: i64, title: &str) -> LexicalDocument {
        LexicalDocument {
            id: DocumentId::Int(id),
            title: title.to_string(),
            text_chunked: format!("{} text", title),
        }
    }

    #[test]
    fn test_rank_keys_follow_order() {
        let results = LexicalResults::new(vec![doc(9, "b"), doc(1, "a")]);
        let keys: Vec<String> = results.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["doc1", "doc2"]);
        assert_eq!(results.get("doc1").unwrap().id, DocumentId::Int(9));
        assert_eq!(results.get("doc2").unwrap().title, "a");
        assert!(results.get("doc0").is_none());
        assert!(results.get("doc3").is_none());
        assert!(results.get("x1").is_none());
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let results = LexicalResults::new(vec![doc(3, "z"), doc(2, "y"), doc(1, "x")]);
        let json = serde_json::to_string(&results).unwrap();

        let p1 = json.find("\"doc1\"").unwrap();
        let p2 = json.find("\"doc2\"").unwrap();
        let p3 = json.find("\"doc3\"").unwrap();
        assert!(p1 < p2 && p2 < p3);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["doc1"]["id"], 3);
        assert_eq!(value["doc1"]["text_chunked"], "z text");
    }

    #[test]
    fn test_empty_results_serialize_to_empty_object() {
        let json = serde_json::to_string(&LexicalResults::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
