//! Resources loaded once at startup.
//!
//! Loading never fails: a broken index leaves `index()` empty and a broken
//! mapping table leaves the map empty, so the server can still start and
//! answer every request with a clear error.

use crate::faiss;
use crate::id_map::IdentifierMap;
use crate::index::VectorIndex;
use std::path::Path;
use std::sync::Arc;

/// Immutable set of search resources shared by all request handlers.
#[derive(Clone, Default)]
pub struct LoadedResources {
    index: Option<Arc<dyn VectorIndex>>,
    ids: IdentifierMap,
}

impl LoadedResources {
    /// Assemble resources directly (used by tests and embedders).
    pub fn new(index: Option<Arc<dyn VectorIndex>>, ids: IdentifierMap) -> Self {
        Self { index, ids }
    }

    /// Load the index and mapping table, logging the outcome of each.
    pub fn load(index_path: &Path, mapping_path: &Path) -> Self {
        let index: Option<Arc<dyn VectorIndex>> = match faiss::read_index(index_path) {
            Ok(index) => {
                tracing::info!(
                    path = ?index_path,
                    dimension = index.dimension(),
                    ntotal = index.ntotal(),
                    metric = %index.metric(),
                    "Vector index loaded"
                );
                Some(Arc::new(index))
            }
            Err(e) => {
                tracing::error!(path = ?index_path, error = %e, "Failed to load vector index");
                None
            }
        };

        let ids = match IdentifierMap::from_csv_path(mapping_path) {
            Ok(ids) => {
                tracing::info!(path = ?mapping_path, count = ids.len(), "Identifier map loaded");
                ids
            }
            Err(e) => {
                tracing::error!(path = ?mapping_path, error = %e, "Failed to load identifier map");
                IdentifierMap::empty()
            }
        };

        Self { index, ids }
    }

    /// The vector index, or `None` when it failed to load.
    pub fn index(&self) -> Option<&Arc<dyn VectorIndex>> {
        self.index.as_ref()
    }

    pub fn ids(&self) -> &IdentifierMap {
        &self.ids
    }

    /// Snapshot of what was loaded, for health reporting.
    pub fn status(&self) -> ResourceStatus {
        ResourceStatus {
            index_loaded: self.index.is_some(),
            dimension: self.index.as_ref().map(|i| i.dimension()),
            ntotal: self.index.as_ref().map(|i| i.ntotal()),
            mapped_ids: self.ids.len(),
        }
    }
}

impl std::fmt::Debug for LoadedResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedResources")
            .field("status", &self.status())
            .finish()
    }
}

/// Summary of loaded resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ResourceStatus {
    pub index_loaded: bool,
    pub dimension: Option<usize>,
    pub ntotal: Option<usize>,
    pub mapped_ids: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::faiss::tests::encode_flat;
    use std::io::Write;

    #[test]
    fn test_load_both_resources() {
        let mut index_file = tempfile::NamedTempFile::new().unwrap();
        index_file
            .write_all(&encode_flat(b"IxF2", 1, 2, &[vec![0.0, 1.0], vec![1.0, 0.0]]))
            .unwrap();
        let mut map_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(map_file, "Index,ID\n0,a\n1,b").unwrap();

        let resources = LoadedResources::load(index_file.path(), map_file.path());
        let status = resources.status();

        assert!(status.index_loaded);
        assert_eq!(status.dimension, Some(2));
        assert_eq!(status.ntotal, Some(2));
        assert_eq!(status.mapped_ids, 2);
    }

    #[test]
    fn test_missing_files_degrade_instead_of_failing() {
        let resources = LoadedResources::load(
            Path::new("/no/such/faiss_index.index"),
            Path::new("/no/such/faiss_csv.csv"),
        );

        assert!(resources.index().is_none());
        assert!(resources.ids().is_empty());
        assert!(!resources.status().index_loaded);
    }

    #[test]
    fn test_mapping_failure_keeps_index() {
        let mut index_file = tempfile::NamedTempFile::new().unwrap();
        index_file
            .write_all(&encode_flat(b"IxF2", 1, 1, &[vec![0.5]]))
            .unwrap();

        let resources =
            LoadedResources::load(index_file.path(), Path::new("/no/such/faiss_csv.csv"));
        assert!(resources.index().is_some());
        assert!(resources.ids().is_empty());
    }
}
