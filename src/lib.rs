//! # smallworld
//!
//! In-memory approximate nearest-neighbor index over fixed-dimensional
//! `f32` vectors, built on a Hierarchical Navigable Small World (HNSW)
//! graph. Supports incremental insertion and top-k queries under
//! Euclidean distance, with sub-linear query time and high recall.
//!
//! This is a pure library crate with no I/O and no async dependencies,
//! suitable for embedding directly in a host application.
//!
//! ```
//! use smallworld::{HnswConfig, Index, Point};
//!
//! let index = Index::with_seed(HnswConfig::new(16, 200), 42).unwrap();
//! index.insert(Point::new(vec![1.0, 2.0, 3.0, 4.0], "a")).unwrap();
//! index.insert(Point::new(vec![5.0, 6.0, 7.0, 8.0], "b")).unwrap();
//!
//! let nearest = index.search(&[1.0, 2.0, 3.0, 4.5], 1).unwrap();
//! assert_eq!(nearest[0].label, "a");
//! ```

/// Compile-time defaults and limits.
pub mod config;
/// Error types surfaced at the API boundary.
pub mod error;
/// HNSW graph: storage, insertion, search, and distance.
pub mod hnsw;
/// Public index handle and introspection types.
pub mod index;
/// Coordinate vector plus opaque label.
pub mod point;

pub use error::IndexError;
pub use hnsw::graph::HnswConfig;
pub use index::{Index, IndexStats, NodeView};
pub use point::Point;
