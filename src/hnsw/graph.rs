//! HNSW graph structure and configuration.
//!
//! [`HnswConfig`] defines tuning parameters (M, ef_construction,
//! ef_search, level multiplier). [`HnswGraph`] stores the layered graph
//! using a Struct-of-Arrays layout: one contiguous coordinate arena plus
//! per-node neighbor lists and layer assignments.

use crate::config;
use crate::error::IndexError;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration parameters for an HNSW index.
///
/// Controls the trade-off between build speed, search speed, recall,
/// and memory usage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HnswConfig {
    /// Number of bidirectional links per node (except layer 0, which
    /// uses `m_max0`).
    pub m: usize,
    /// Maximum links per node at layer 0 (typically `2 * m`).
    pub m_max0: usize,
    /// Candidate list size during index construction.
    pub ef_construction: usize,
    /// Candidate list size during search (higher = better recall,
    /// slower). Queries use `max(k, ef_search)` at layer 0.
    pub ef_search: usize,
    /// Level generation multiplier. Nodes land on layer
    /// `floor(-ln(r) * level_mult)`; `1 / ln(m)` balances layer sizes.
    pub level_mult: f64,
    /// Maximum number of layers in the graph.
    pub max_layers: usize,
}

impl HnswConfig {
    /// Creates a configuration from `m` and `ef_construction`, deriving
    /// the remaining fields: `m_max0 = 2m`, `ef_search =
    /// ef_construction`, `level_mult = 1 / ln(m)`.
    pub fn new(m: usize, ef_construction: usize) -> Self {
        Self {
            m,
            m_max0: m * 2,
            ef_construction,
            ef_search: ef_construction,
            level_mult: if m > 1 { 1.0 / (m as f64).ln() } else { 1.0 },
            max_layers: config::MAX_LAYERS,
        }
    }

    /// Checks every tunable, returning `InvalidConfig` on the first
    /// violation.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.m < 1 {
            return Err(IndexError::InvalidConfig("m must be positive".into()));
        }
        if self.m_max0 < self.m {
            return Err(IndexError::InvalidConfig(format!(
                "m_max0 ({}) must be at least m ({})",
                self.m_max0, self.m
            )));
        }
        if self.ef_construction < 1 {
            return Err(IndexError::InvalidConfig(
                "ef_construction must be positive".into(),
            ));
        }
        if self.ef_search < 1 {
            return Err(IndexError::InvalidConfig(
                "ef_search must be positive".into(),
            ));
        }
        if !(self.level_mult > 0.0 && self.level_mult.is_finite()) {
            return Err(IndexError::InvalidConfig(
                "level_mult must be positive and finite".into(),
            ));
        }
        if self.max_layers < 1 || self.max_layers > 255 {
            return Err(IndexError::InvalidConfig(
                "max_layers must be between 1 and 255".into(),
            ));
        }
        Ok(())
    }
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self::new(config::DEFAULT_M, config::DEFAULT_EF_CONSTRUCTION)
    }
}

/// HNSW graph using a Struct-of-Arrays layout.
///
/// Coordinates are stored contiguously in `vectors`, strided by
/// `dimension`. Node ids are dense insertion-order `u32`s; adjacency
/// lists hold ids. The dimension is established by the first inserted
/// vector.
#[derive(Debug, Serialize, Deserialize)]
pub struct HnswGraph {
    pub config: HnswConfig,
    /// Coordinate arena: node `i` occupies `[i * dimension, (i + 1) * dimension)`.
    pub vectors: Vec<f32>,
    /// Adjacency lists indexed `[node][layer][slot]`. A node at top
    /// level `l` has exactly `l + 1` layer lists.
    pub neighbors: Vec<Vec<Vec<u32>>>,
    /// Top level of each node.
    pub levels: Vec<u8>,
    /// Starting node for all top-down traversals; always a node whose
    /// top level equals `max_layer`.
    pub entry_point: Option<u32>,
    /// Highest top level across all nodes.
    pub max_layer: usize,
    pub dimension: usize,
    pub node_count: u32,
}

impl HnswGraph {
    /// Creates an empty graph. The dimension is fixed on first insert.
    pub fn new(config: HnswConfig) -> Self {
        Self {
            config,
            vectors: Vec::new(),
            neighbors: Vec::new(),
            levels: Vec::new(),
            entry_point: None,
            max_layer: 0,
            dimension: 0,
            node_count: 0,
        }
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.node_count as usize
    }

    /// Returns `true` if the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Coordinate slice for the given node. O(1) view into the arena.
    #[inline]
    pub fn vector(&self, id: u32) -> &[f32] {
        let start = id as usize * self.dimension;
        &self.vectors[start..start + self.dimension]
    }

    /// Top level assigned to the given node.
    #[inline]
    pub fn level(&self, id: u32) -> usize {
        self.levels[id as usize] as usize
    }

    /// Hard neighbor cap at the given layer: `m_max0` at layer 0, `m`
    /// above.
    #[inline]
    pub fn m_max(&self, layer: usize) -> usize {
        if layer == 0 {
            self.config.m_max0
        } else {
            self.config.m
        }
    }

    /// Sample a top level from the truncated geometric distribution
    /// `floor(-ln(r) * level_mult)`.
    ///
    /// `r` is drawn uniformly from `(0, 1]` by mirroring the generator's
    /// `[0, 1)` output, so `ln(0)` can never occur. The result is
    /// clamped to `max_layers - 1`.
    pub fn random_level<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let r = 1.0 - rng.random::<f64>();
        let level = (-r.ln() * self.config.level_mult).floor() as usize;
        level.min(self.config.max_layers - 1)
    }

    /// Append a node's arrays: coordinates, layer lists, and level.
    pub(crate) fn push_node(
        &mut self,
        vector: &[f32],
        level: usize,
        layer_neighbors: Vec<Vec<u32>>,
    ) {
        debug_assert_eq!(layer_neighbors.len(), level + 1);
        self.vectors.extend_from_slice(vector);
        self.neighbors.push(layer_neighbors);
        self.levels.push(level as u8);
        self.node_count += 1;
    }
}
