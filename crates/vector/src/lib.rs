//! Dense vector retrieval.
//!
//! Loads a FAISS flat index and its position-to-identifier table once at
//! startup, then serves validated k-NN query batches from them.
//!
//! # Example
//! ```no_run
//! use medrag_vector::{LoadedResources, VectorSearchService};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! let resources = LoadedResources::load(
//!     Path::new("faiss_indices/faiss_index.index"),
//!     Path::new("faiss_indices/faiss_csv.csv"),
//! );
//! let service = VectorSearchService::new(Arc::new(resources));
//! let response = service.search(&[vec![0.1, 0.2, 0.3, 0.4]], 5);
//! ```

pub mod faiss;
pub mod id_map;
pub mod index;
pub mod resources;
pub mod service;

// Re-export main types
pub use id_map::IdentifierMap;
pub use index::{FlatIndex, Metric, Neighbors, VectorIndex, NO_NEIGHBOR};
pub use resources::{LoadedResources, ResourceStatus};
pub use service::{SearchRequest, SearchResponse, VectorSearchService};
