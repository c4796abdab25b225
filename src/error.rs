//! Error types surfaced at the API boundary.
//!
//! Every fallible operation validates its inputs before mutating any
//! state, so a returned error never leaves the index partially updated.

use thiserror::Error;

/// Errors returned by [`crate::Index`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// A tunable was out of range (non-positive `m`, `ef_construction`,
    /// `ef_search`, `level_mult`, `max_layers`, or `k`).
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A point or query vector length differed from the dimension
    /// established by the first insert.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension established by the first inserted point.
        expected: usize,
        /// Length of the offending vector.
        actual: usize,
    },
}
