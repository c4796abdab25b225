//! Core point type for smallworld.
//!
//! A [`Point`] pairs a fixed-dimensional coordinate vector with an
//! opaque caller-supplied label. Labels are carried through queries and
//! introspection untouched; the index never interprets them and does
//! not require them to be unique.

use serde::{Deserialize, Serialize};

/// A coordinate vector with an opaque label.
///
/// Points are immutable once inserted. The label identifies the point
/// to the caller; node identity inside the index is the internal
/// insertion-order id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Coordinates. Every point in an index has the same length.
    pub coords: Vec<f32>,
    /// Caller-supplied identifier, not interpreted by the index.
    pub label: String,
}

impl Point {
    /// Creates a new point from coordinates and a label.
    pub fn new(coords: Vec<f32>, label: impl Into<String>) -> Self {
        Self {
            coords,
            label: label.into(),
        }
    }

    /// Number of coordinates.
    pub fn dimension(&self) -> usize {
        self.coords.len()
    }
}
