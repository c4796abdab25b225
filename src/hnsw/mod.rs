//! Hierarchical Navigable Small World (HNSW) approximate nearest neighbor index.
//!
//! This module implements the HNSW algorithm: a multi-layer proximity
//! graph where sparse upper layers provide long-range shortcuts and the
//! dense base layer provides local connectivity. Queries descend
//! greedily from the top layer and finish with a bounded best-first
//! search at layer 0.
//!
//! The graph uses a Struct-of-Arrays layout: all coordinates live in a
//! contiguous arena, with separate arrays for neighbor lists and layer
//! assignments. Nodes are identified by dense `u32` ids in insertion
//! order; adjacency lists hold ids, never references.

/// Euclidean distance.
pub mod distance;
/// Graph structure, configuration, and level sampling.
pub mod graph;
/// Insertion with bidirectional linking and over-degree pruning.
pub mod insert;
/// Single-layer bounded best-first search and multi-layer KNN.
pub mod search;
/// Epoch-based visited set for graph traversal.
pub mod visited;

pub use graph::{HnswConfig, HnswGraph};
pub use search::knn_search;
