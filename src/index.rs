//! Public index handle and introspection types.
//!
//! [`Index`] is a cloneable handle over shared index state. Reads
//! (`search`, `len`, `iter_nodes`, `stats`) take a shared lock; `insert`
//! takes an exclusive one, so many readers may run concurrently between
//! writes. Single-threaded hosts never contend.

use crate::config;
use crate::error::IndexError;
use crate::hnsw::graph::{HnswConfig, HnswGraph};
use crate::hnsw::knn_search;
use crate::point::Point;
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Index state behind the lock: the graph plus the label store, which
/// is parallel to the graph's internal node ids, and the level RNG.
#[derive(Debug)]
struct IndexData {
    graph: HnswGraph,
    labels: Vec<String>,
    rng: StdRng,
}

/// An in-memory HNSW approximate nearest-neighbor index.
///
/// Supports incremental insertion and top-k queries under Euclidean
/// distance. The vector dimension is established by the first inserted
/// point; every later point and query must match it. Cloning produces
/// another handle to the same shared index.
#[derive(Debug, Clone)]
pub struct Index {
    data: Arc<RwLock<IndexData>>,
}

impl Index {
    /// Creates an empty index with an OS-seeded level generator.
    pub fn new(config: HnswConfig) -> Result<Self, IndexError> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Creates an empty index with a fixed seed.
    ///
    /// With the same seed and the same insertion sequence, the
    /// resulting graph and all query results are identical across runs.
    pub fn with_seed(config: HnswConfig, seed: u64) -> Result<Self, IndexError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: HnswConfig, rng: StdRng) -> Result<Self, IndexError> {
        config.validate()?;
        tracing::debug!(
            m = config.m,
            ef_construction = config.ef_construction,
            ef_search = config.ef_search,
            "index created"
        );
        Ok(Self {
            data: Arc::new(RwLock::new(IndexData {
                graph: HnswGraph::new(config),
                labels: Vec::new(),
                rng,
            })),
        })
    }

    /// Inserts a point.
    ///
    /// The first insert establishes the index dimension (bounded by
    /// [`config::MAX_DIMENSION`]); later inserts must match it.
    /// Validation happens before any state changes, so a rejected point
    /// leaves the index untouched.
    pub fn insert(&self, point: Point) -> Result<(), IndexError> {
        debug_assert!(
            point.coords.iter().all(|x| x.is_finite()),
            "non-finite coordinate"
        );
        let mut guard = self.data.write();
        let data = &mut *guard;
        if data.graph.node_count == 0 {
            if point.coords.is_empty() || point.coords.len() > config::MAX_DIMENSION {
                return Err(IndexError::InvalidConfig(format!(
                    "dimension must be between 1 and {}",
                    config::MAX_DIMENSION
                )));
            }
        } else if point.coords.len() != data.graph.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: data.graph.dimension,
                actual: point.coords.len(),
            });
        }
        let level = data.graph.random_level(&mut data.rng);
        let Point { coords, label } = point;
        data.graph.insert(&coords, level);
        data.labels.push(label);
        Ok(())
    }

    /// Returns the `min(k, len)` points closest to `query`, ascending
    /// by distance with ties broken by insertion order.
    ///
    /// An empty index yields an empty result, not an error.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Point>, IndexError> {
        if k < 1 {
            return Err(IndexError::InvalidConfig("k must be positive".into()));
        }
        debug_assert!(query.iter().all(|x| x.is_finite()), "non-finite coordinate");
        let data = self.data.read();
        if data.graph.node_count == 0 {
            return Ok(Vec::new());
        }
        if query.len() != data.graph.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: data.graph.dimension,
                actual: query.len(),
            });
        }
        let results = knn_search(&data.graph, query, k);
        Ok(results
            .into_iter()
            .map(|(_, id)| {
                Point::new(
                    data.graph.vector(id).to_vec(),
                    data.labels[id as usize].clone(),
                )
            })
            .collect())
    }

    /// Number of points in the index.
    pub fn len(&self) -> usize {
        self.data.read().graph.len()
    }

    /// Returns `true` if no points have been inserted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The dimension established by the first insert, or `None` while
    /// the index is empty.
    pub fn dimension(&self) -> Option<usize> {
        let data = self.data.read();
        (data.graph.node_count > 0).then_some(data.graph.dimension)
    }

    /// Iterates over a read-only snapshot of every node: label,
    /// coordinates, top level, and per-layer neighbor labels, in
    /// insertion order. Debugging aid; never mutates.
    pub fn iter_nodes(&self) -> impl Iterator<Item = NodeView> {
        let data = self.data.read();
        let views: Vec<NodeView> = (0..data.graph.node_count)
            .map(|id| NodeView {
                label: data.labels[id as usize].clone(),
                coords: data.graph.vector(id).to_vec(),
                top_level: data.graph.level(id),
                neighbors: data.graph.neighbors[id as usize]
                    .iter()
                    .map(|layer| {
                        layer
                            .iter()
                            .map(|&nb| data.labels[nb as usize].clone())
                            .collect()
                    })
                    .collect(),
            })
            .collect();
        views.into_iter()
    }

    /// Aggregate shape of the graph, for debugging and tuning.
    pub fn stats(&self) -> IndexStats {
        let data = self.data.read();
        let g = &data.graph;
        let mut nodes_per_layer = vec![0usize; g.max_layer + 1];
        let mut edges = 0usize;
        for id in 0..g.node_count {
            for layer in 0..=g.level(id) {
                nodes_per_layer[layer] += 1;
                edges += g.neighbors[id as usize][layer].len();
            }
        }
        IndexStats {
            len: g.len(),
            dimension: (g.node_count > 0).then_some(g.dimension),
            max_layer: g.max_layer,
            nodes_per_layer,
            avg_edges: if g.node_count > 0 {
                edges as f64 / g.node_count as f64
            } else {
                0.0
            },
        }
    }
}

/// Read-only snapshot of one node, yielded by [`Index::iter_nodes`].
#[derive(Debug, Clone, PartialEq)]
pub struct NodeView {
    /// The point's label.
    pub label: String,
    /// The point's coordinates.
    pub coords: Vec<f32>,
    /// Highest layer the node appears on.
    pub top_level: usize,
    /// `neighbors[l]` holds the labels of the node's layer-`l`
    /// neighbors, `0 <= l <= top_level`.
    pub neighbors: Vec<Vec<String>>,
}

/// Aggregate graph shape, returned by [`Index::stats`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndexStats {
    /// Number of points.
    pub len: usize,
    /// Established dimension, if any point has been inserted.
    pub dimension: Option<usize>,
    /// Highest layer in the graph.
    pub max_layer: usize,
    /// Number of nodes present at each layer, layer 0 first.
    pub nodes_per_layer: Vec<usize>,
    /// Average number of edges per node, summed over its layers.
    pub avg_edges: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(m: usize, ef: usize, seed: u64) -> Index {
        Index::with_seed(HnswConfig::new(m, ef), seed).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let config = HnswConfig {
            m: 0,
            ..HnswConfig::default()
        };
        assert!(matches!(
            Index::new(config),
            Err(IndexError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_insert_and_len() {
        let idx = index(4, 32, 1);
        assert!(idx.is_empty());
        idx.insert(Point::new(vec![1.0, 2.0], "a")).unwrap();
        idx.insert(Point::new(vec![3.0, 4.0], "b")).unwrap();
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.dimension(), Some(2));
    }

    #[test]
    fn test_empty_coords_rejected() {
        let idx = index(4, 32, 1);
        assert!(matches!(
            idx.insert(Point::new(Vec::new(), "empty")),
            Err(IndexError::InvalidConfig(_))
        ));
        assert!(idx.is_empty());
    }

    #[test]
    fn test_dimension_mismatch_on_insert() {
        let idx = index(4, 32, 1);
        idx.insert(Point::new(vec![1.0, 2.0], "a")).unwrap();
        let err = idx.insert(Point::new(vec![1.0, 2.0, 3.0], "b")).unwrap_err();
        assert_eq!(
            err,
            IndexError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
        // The rejected point must not have been stored.
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn test_dimension_mismatch_on_search() {
        let idx = index(4, 32, 1);
        idx.insert(Point::new(vec![1.0, 2.0], "a")).unwrap();
        assert!(idx.search(&[1.0, 2.0, 3.0], 1).is_err());
    }

    #[test]
    fn test_zero_k_rejected() {
        let idx = index(4, 32, 1);
        assert!(matches!(
            idx.search(&[0.0], 0),
            Err(IndexError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_search_returns_sorted_points() {
        let idx = index(4, 32, 9);
        for (coords, label) in [
            (vec![0.0, 0.0], "origin"),
            (vec![5.0, 0.0], "mid"),
            (vec![10.0, 0.0], "far"),
        ] {
            idx.insert(Point::new(coords, label)).unwrap();
        }
        let out = idx.search(&[1.0, 0.0], 3).unwrap();
        let labels: Vec<&str> = out.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["origin", "mid", "far"]);
    }

    #[test]
    fn test_search_caps_at_len() {
        let idx = index(4, 32, 9);
        idx.insert(Point::new(vec![1.0], "only")).unwrap();
        let out = idx.search(&[0.0], 5).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_cloned_handle_shares_state() {
        let idx = index(4, 32, 9);
        let other = idx.clone();
        idx.insert(Point::new(vec![1.0], "a")).unwrap();
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_iter_nodes_snapshot() {
        let idx = index(4, 32, 5);
        idx.insert(Point::new(vec![0.0], "a")).unwrap();
        idx.insert(Point::new(vec![1.0], "b")).unwrap();
        let views: Vec<NodeView> = idx.iter_nodes().collect();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].label, "a");
        assert_eq!(views[0].coords, vec![0.0]);
        assert!(views[0].neighbors[0].contains(&"b".to_string()));
        assert!(views[1].neighbors[0].contains(&"a".to_string()));
    }

    #[test]
    fn test_stats_counts_layers() {
        let idx = index(4, 32, 5);
        for i in 0..20 {
            idx.insert(Point::new(vec![i as f32], format!("p{i}"))).unwrap();
        }
        let stats = idx.stats();
        assert_eq!(stats.len, 20);
        assert_eq!(stats.dimension, Some(1));
        assert_eq!(stats.nodes_per_layer[0], 20);
        assert_eq!(stats.nodes_per_layer.len(), stats.max_layer + 1);
        assert!(stats.avg_edges > 0.0);
    }

    #[test]
    fn test_empty_stats() {
        let idx = index(4, 32, 5);
        let stats = idx.stats();
        assert_eq!(stats.len, 0);
        assert_eq!(stats.dimension, None);
        assert_eq!(stats.avg_edges, 0.0);
    }
}
