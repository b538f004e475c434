//! Vector search request handling.
//!
//! Validation runs in a fixed order before the index is touched:
//! presence of `queries`, numeric coercion, index availability, dimensionality.

use crate::index::NO_NEIGHBOR;
use crate::resources::LoadedResources;
use medrag_core::{AppError, AppResult, DocumentId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Neighbors per query when a request omits `k`.
pub const DEFAULT_K: usize = 5;

/// Largest `k` accepted when no limit is configured.
pub const DEFAULT_MAX_K: usize = 1024;

pub const MISSING_QUERIES: &str = "Missing \"queries\" field";
pub const INDEX_NOT_LOADED: &str = "Index not loaded on server";
pub const NON_FINITE_QUERY: &str = "Invalid \"queries\": value out of f32 range";

/// A validated search request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub queries: Vec<Vec<f32>>,
    pub k: usize,
}

impl SearchRequest {
    pub fn new(queries: Vec<Vec<f32>>, k: usize) -> Self {
        Self { queries, k }
    }

    /// Parse a raw request body.
    ///
    /// A body that is not a JSON object, or has no non-null `queries`, is
    /// rejected before any numeric coercion is attempted.
    pub fn from_slice(body: &[u8], default_k: usize) -> AppResult<Self> {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "Request body is not valid JSON");
                return Err(AppError::bad_request(MISSING_QUERIES));
            }
        };
        Self::from_value(value, default_k)
    }

    /// Validate an already-decoded JSON body.
    pub fn from_value(value: Value, default_k: usize) -> AppResult<Self> {
        let Value::Object(mut body) = value else {
            return Err(AppError::bad_request(MISSING_QUERIES));
        };

        let queries = match body.remove("queries") {
            None | Some(Value::Null) => return Err(AppError::bad_request(MISSING_QUERIES)),
            Some(queries) => queries,
        };

        // Numbers beyond f32 range decode as infinities rather than failing.
        let queries: Vec<Vec<f32>> = serde_json::from_value(queries)
            .map_err(|e| AppError::bad_request(format!("Invalid \"queries\": {}", e)))?;
        ensure_finite(&queries)?;

        let k = match body.remove("k") {
            None | Some(Value::Null) => default_k,
            Some(k) => {
                let k: i64 = serde_json::from_value(k)
                    .map_err(|e| AppError::bad_request(format!("Invalid \"k\": {}", e)))?;
                if k <= 0 {
                    return Err(AppError::bad_request(format!(
                        "Invalid \"k\": must be a positive integer, got {}",
                        k
                    )));
                }
                usize::try_from(k).map_err(|e| AppError::bad_request(format!("Invalid \"k\": {}", e)))?
            }
        };

        Ok(Self { queries, k })
    }
}

/// Search results aligned one-to-one with the request's queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub ids: Vec<Vec<Option<DocumentId>>>,
    pub distances: Vec<Vec<f32>>,
}

/// Validates query batches and serves them from the loaded resources.
#[derive(Debug, Clone)]
pub struct VectorSearchService {
    resources: Arc<LoadedResources>,
    default_k: usize,
    max_k: usize,
}

impl VectorSearchService {
    pub fn new(resources: Arc<LoadedResources>) -> Self {
        Self {
            resources,
            default_k: DEFAULT_K,
            max_k: DEFAULT_MAX_K,
        }
    }

    /// Override the default and maximum `k`.
    pub fn with_limits(mut self, default_k: usize, max_k: usize) -> Self {
        self.default_k = default_k;
        self.max_k = max_k;
        self
    }

    pub fn resources(&self) -> &LoadedResources {
        &self.resources
    }

    /// Parse and execute a raw request body.
    pub fn handle(&self, body: &[u8]) -> AppResult<SearchResponse> {
        let request = SearchRequest::from_slice(body, self.default_k)?;
        self.search(&request.queries, request.k)
    }

    /// Search the index for the `k` nearest neighbors of every query.
    pub fn search(&self, queries: &[Vec<f32>], k: usize) -> AppResult<SearchResponse> {
        if k == 0 || k > self.max_k {
            return Err(AppError::bad_request(format!(
                "Invalid \"k\": must be between 1 and {}, got {}",
                self.max_k, k
            )));
        }

        let index = self
            .resources
            .index()
            .ok_or_else(|| AppError::ServiceUnavailable(INDEX_NOT_LOADED.to_string()))?;

        let required_dim = index.dimension();
        if let Some(query) = queries.iter().find(|q| q.len() != required_dim) {
            let message = format!(
                "Dimension mismatch: You sent {} dimensions, but Index requires {} dimensions.",
                query.len(),
                required_dim
            );
            tracing::warn!(sent = query.len(), required = required_dim, "{}", message);
            return Err(AppError::BadRequest(message));
        }

        ensure_finite(queries)?;

        if queries.is_empty() {
            return Ok(SearchResponse {
                ids: Vec::new(),
                distances: Vec::new(),
            });
        }

        let neighbors = index.search(queries, k)?;
        if neighbors.len() != queries.len() {
            return Err(AppError::internal(format!(
                "Index returned {} result rows for {} queries",
                neighbors.len(),
                queries.len()
            )));
        }

        let padding = index.metric().padding();
        let ids_map = self.resources.ids();
        let mut ids = Vec::with_capacity(neighbors.len());
        let mut distances = Vec::with_capacity(neighbors.len());
        for row in neighbors {
            ids.push(
                row.positions
                    .iter()
                    .map(|&position| {
                        if position == NO_NEIGHBOR {
                            None
                        } else {
                            Some(ids_map.resolve(position))
                        }
                    })
                    .collect(),
            );
            distances.push(
                row.distances
                    .into_iter()
                    .map(|d| clamp_distance(d, padding))
                    .collect(),
            );
        }

        Ok(SearchResponse { ids, distances })
    }
}

fn ensure_finite(queries: &[Vec<f32>]) -> AppResult<()> {
    if queries.iter().flatten().all(|x| x.is_finite()) {
        Ok(())
    } else {
        Err(AppError::bad_request(NON_FINITE_QUERY))
    }
}

/// Keep distances representable in JSON: overflow saturates, NaN becomes padding.
fn clamp_distance(distance: f32, padding: f32) -> f32 {
    if distance.is_nan() {
        padding
    } else {
        distance.clamp(-f32::MAX, f32::MAX)
    }
}
