//! Vector index abstraction and the exact (flat) implementation.
//!
//! Positions are zero-based `i64` values in `[0, ntotal)`; `NO_NEIGHBOR`
//! fills slots the index cannot serve (fewer than `k` vectors).

use medrag_core::{AppError, AppResult};
use std::cmp::Ordering;

/// Sentinel position for "no neighbor found".
pub const NO_NEIGHBOR: i64 = -1;

/// Distance metric of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Squared Euclidean distance; smaller is nearer.
    L2,
    /// Dot product; larger is nearer.
    InnerProduct,
}

impl Metric {
    /// Distance reported for padded slots.
    pub fn padding(self) -> f32 {
        match self {
            Metric::L2 => f32::MAX,
            Metric::InnerProduct => -f32::MAX,
        }
    }

    fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Metric::L2 => a
                .iter()
                .zip(b)
                .map(|(x, y)| {
                    let d = x - y;
                    d * d
                })
                .sum(),
            Metric::InnerProduct => a.iter().zip(b).map(|(x, y)| x * y).sum(),
        }
    }

    /// Ordering that puts the nearest distance first.
    fn nearest_first(self, a: f32, b: f32) -> Ordering {
        match self {
            Metric::L2 => a.total_cmp(&b),
            Metric::InnerProduct => b.total_cmp(&a),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Metric::L2 => f.write_str("l2"),
            Metric::InnerProduct => f.write_str("inner_product"),
        }
    }
}

/// Result of one k-NN query: exactly `k` parallel slots, nearest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbors {
    pub positions: Vec<i64>,
    pub distances: Vec<f32>,
}

/// Trait for read-only nearest-neighbor indexes.
///
/// Implementations are immutable after construction and must be safe to
/// query from many threads at once.
pub trait VectorIndex: Send + Sync {
    /// Fixed dimensionality `d` of every indexed and query vector.
    fn dimension(&self) -> usize;

    /// Number of indexed vectors.
    fn ntotal(&self) -> usize;

    /// Distance metric used for ranking.
    fn metric(&self) -> Metric;

    /// Search for the `k` nearest neighbors of every query.
    ///
    /// Callers must pass vectors of length `dimension()`. Each result has
    /// exactly `k` slots; unfilled slots hold [`NO_NEIGHBOR`].
    fn search(&self, queries: &[Vec<f32>], k: usize) -> AppResult<Vec<Neighbors>>;
}

/// Exact index over a contiguous row-major buffer of vectors.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    metric: Metric,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Build an index from a row-major buffer of `ntotal * dimension` floats.
    pub fn from_flat(dimension: usize, metric: Metric, data: Vec<f32>) -> AppResult<Self> {
        if dimension == 0 {
            return Err(AppError::IndexLoad(
                "Index dimension must be positive".to_string(),
            ));
        }
        if data.len() % dimension != 0 {
            return Err(AppError::IndexLoad(format!(
                "Vector buffer of {} floats is not a multiple of dimension {}",
                data.len(),
                dimension
            )));
        }

        Ok(Self {
            dimension,
            metric,
            data,
        })
    }

    /// Build an index from individual vectors, all of length `dimension`.
    pub fn from_vectors(dimension: usize, metric: Metric, vectors: &[Vec<f32>]) -> AppResult<Self> {
        let mut data = Vec::with_capacity(dimension * vectors.len());
        for (position, vector) in vectors.iter().enumerate() {
            if vector.len() != dimension {
                return Err(AppError::IndexLoad(format!(
                    "Vector at position {} has {} dimensions, expected {}",
                    position,
                    vector.len(),
                    dimension
                )));
            }
            data.extend_from_slice(vector);
        }
        Self::from_flat(dimension, metric, data)
    }

    fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimension)
    }

    fn search_one(&self, query: &[f32], k: usize) -> Neighbors {
        let mut scored: Vec<(i64, f32)> = self
            .rows()
            .enumerate()
            .map(|(position, row)| (position as i64, self.metric.distance(query, row)))
            .collect();

        let metric = self.metric;
        let by_rank = |a: &(i64, f32), b: &(i64, f32)| {
            metric.nearest_first(a.1, b.1).then(a.0.cmp(&b.0))
        };

        if scored.len() > k {
            scored.select_nth_unstable_by(k - 1, by_rank);
            scored.truncate(k);
        }
        scored.sort_by(by_rank);

        let mut positions = Vec::with_capacity(k);
        let mut distances = Vec::with_capacity(k);
        for (position, distance) in scored {
            positions.push(position);
            distances.push(distance);
        }
        positions.resize(k, NO_NEIGHBOR);
        distances.resize(k, self.metric.padding());

        Neighbors {
            positions,
            distances,
        }
    }
}

impl VectorIndex for FlatIndex {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn ntotal(&self) -> usize {
        self.data.len() / self.dimension
    }

    fn metric(&self) -> Metric {
        self.metric
    }

    fn search(&self, queries: &[Vec<f32>], k: usize) -> AppResult<Vec<Neighbors>> {
        if k == 0 {
            return Err(AppError::bad_request("k must be a positive integer"));
        }

        queries
            .iter()
            .map(|query| {
                if query.len() != self.dimension {
                    return Err(AppError::internal(format!(
                        "Query of {} dimensions passed to index of dimension {}",
                        query.len(),
                        self.dimension
                    )));
                }
                Ok(self.search_one(query, k))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index(metric: Metric) -> FlatIndex {
        FlatIndex::from_vectors(
            2,
            metric,
            &[
                vec![0.0, 0.0],
                vec![1.0, 0.0],
                vec![0.0, 2.0],
                vec![3.0, 3.0],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_l2_nearest_first() {
        let index = sample_index(Metric::L2);
        assert_eq!(index.ntotal(), 4);
        assert_eq!(index.dimension(), 2);

        let result = index.search(&[vec![0.9, 0.1]], 3).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].positions, vec![1, 0, 2]);

        let d = &result[0].distances;
        assert!(d.windows(2).all(|w| w[0] <= w[1]));
        assert!((d[0] - 0.02).abs() < 1e-6);
    }

    #[test]
    fn test_inner_product_largest_first() {
        let index = sample_index(Metric::InnerProduct);
        let result = index.search(&[vec![1.0, 1.0]], 2).unwrap();
        assert_eq!(result[0].positions, vec![3, 2]);
        assert_eq!(result[0].distances, vec![6.0, 2.0]);
    }

    #[test]
    fn test_padding_when_k_exceeds_ntotal() {
        let index = sample_index(Metric::L2);
        let result = index.search(&[vec![0.0, 0.0]], 6).unwrap();
        let neighbors = &result[0];

        assert_eq!(neighbors.positions.len(), 6);
        assert_eq!(neighbors.distances.len(), 6);
        assert_eq!(&neighbors.positions[4..], &[NO_NEIGHBOR, NO_NEIGHBOR]);
        assert_eq!(neighbors.distances[5], f32::MAX);
    }

    #[test]
    fn test_ties_break_by_position() {
        let index = FlatIndex::from_vectors(
            1,
            Metric::L2,
            &[vec![1.0], vec![-1.0], vec![1.0], vec![5.0]],
        )
        .unwrap();

        let result = index.search(&[vec![0.0]], 3).unwrap();
        assert_eq!(result[0].positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_batch_results_align_with_queries() {
        let index = sample_index(Metric::L2);
        let queries = vec![vec![0.0, 0.0], vec![3.0, 3.0], vec![0.0, 2.1]];
        let result = index.search(&queries, 1).unwrap();

        let firsts: Vec<i64> = result.iter().map(|n| n.positions[0]).collect();
        assert_eq!(firsts, vec![0, 3, 2]);
    }

    #[test]
    fn test_empty_index_returns_only_sentinels() {
        let index = FlatIndex::from_flat(3, Metric::L2, Vec::new()).unwrap();
        let result = index.search(&[vec![1.0, 2.0, 3.0]], 2).unwrap();
        assert_eq!(result[0].positions, vec![NO_NEIGHBOR, NO_NEIGHBOR]);
    }

    #[test]
    fn test_rejects_ragged_construction() {
        assert!(FlatIndex::from_vectors(2, Metric::L2, &[vec![1.0, 2.0], vec![1.0]]).is_err());
        assert!(FlatIndex::from_flat(0, Metric::L2, vec![]).is_err());
        assert!(FlatIndex::from_flat(2, Metric::L2, vec![1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_search_rejects_zero_k() {
        let index = sample_index(Metric::L2);
        assert!(index.search(&[vec![0.0, 0.0]], 0).is_err());
    }
}
