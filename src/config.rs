//! Global configuration constants for smallworld.
//!
//! Compile-time defaults and input validation limits live here; runtime
//! tunables are carried by [`crate::hnsw::graph::HnswConfig`].

/// Default number of bidirectional links per HNSW node.
///
/// Higher values improve recall but increase memory and build time.
/// Typical range: 8–64. Default: 16.
pub const DEFAULT_M: usize = 16;

/// Default ef parameter during index construction.
///
/// Controls the size of the dynamic candidate list during insertion.
/// Higher values produce a better graph but slow down build time.
pub const DEFAULT_EF_CONSTRUCTION: usize = 200;

/// Maximum number of layers in the HNSW graph.
///
/// Levels sampled above this are clamped. With the default level
/// multiplier the clamp is effectively unreachable below billions of
/// nodes.
pub const MAX_LAYERS: usize = 16;

/// Maximum allowed vector dimension.
pub const MAX_DIMENSION: usize = 4096;
