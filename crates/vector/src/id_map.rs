//! Position to document identifier mapping.
//!
//! Built once from a CSV table with `Index` and `ID` columns and read-only
//! afterwards. Lookups that miss fall back to the stringified position; see
//! [`IdentifierMap::resolve`].

use medrag_core::{AppError, AppResult, DocumentId};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

/// One row of the mapping table. Extra columns are ignored.
#[derive(Debug, Deserialize)]
struct MappingRow {
    #[serde(rename = "Index")]
    index: i64,
    #[serde(rename = "ID")]
    id: String,
}

/// Bidirectional mapping between index positions and document identifiers.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    by_position: HashMap<i64, DocumentId>,
    by_id: HashMap<DocumentId, i64>,
}

impl IdentifierMap {
    /// An empty map; every lookup falls back to the position.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the mapping table from a CSV file.
    pub fn from_csv_path(path: &Path) -> AppResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            AppError::IndexLoad(format!("Failed to open mapping file {:?}: {}", path, e))
        })?;
        Self::from_csv_reader(file)
    }

    /// Load the mapping table from any CSV source with a header row.
    ///
    /// When a position appears twice the later row wins.
    pub fn from_csv_reader<R: Read>(reader: R) -> AppResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut duplicates = 0usize;
        let mut pairs = Vec::new();
        for row in csv_reader.deserialize::<MappingRow>() {
            let row = row?;
            pairs.push((row.index, DocumentId::parse(&row.id)));
        }

        let mut map = Self::default();
        for (position, id) in pairs {
            if map.insert(position, id) {
                duplicates += 1;
            }
        }

        if duplicates > 0 {
            tracing::warn!(
                duplicates,
                "Mapping table repeats positions; later rows replaced earlier ones"
            );
        }

        Ok(map)
    }

    /// Insert a mapping, returning true when it replaced an existing position.
    fn insert(&mut self, position: i64, id: DocumentId) -> bool {
        let previous = self.by_position.insert(position, id.clone());
        if let Some(old) = &previous {
            if self.by_id.get(old) == Some(&position) {
                self.by_id.remove(old);
            }
        }
        self.by_id.insert(id, position);
        previous.is_some()
    }

    /// Identifier stored for `position`, if any.
    pub fn get(&self, position: i64) -> Option<&DocumentId> {
        self.by_position.get(&position)
    }

    /// Identifier for `position`, defaulting to the stringified position.
    ///
    /// A miss means the index and the table disagree; it is served rather
    /// than failed so one stale row does not break a whole query.
    pub fn resolve(&self, position: i64) -> DocumentId {
        match self.by_position.get(&position) {
            Some(id) => id.clone(),
            None => {
                tracing::debug!(position, "No identifier mapped; using position");
                DocumentId::Text(position.to_string())
            }
        }
    }

    /// Reverse lookup: index position of a document identifier.
    pub fn position_of(&self, id: &DocumentId) -> Option<i64> {
        self.by_id.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_position.is_empty()
    }
}

impl FromIterator<(i64, DocumentId)> for IdentifierMap {
    fn from_iter<T: IntoIterator<Item = (i64, DocumentId)>>(iter: T) -> Self {
        let mut map = Self::default();
        for (position, id) in iter {
            map.insert(position, id);
        }
        map
    }
}
