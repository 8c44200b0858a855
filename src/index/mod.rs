//! Vector index for nearest-neighbor lookup over document embeddings.
//!
//! Positions are the insertion order of the embeddings, so position `i`
//! always refers to the `i`-th document of the corpus the index was built from.

mod flat;

pub use flat::FlatL2Index;

use serde::{Deserialize, Serialize};

/// A search hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Position of the matched embedding.
    pub position: usize,
    /// Squared Euclidean distance to the query (lower is closer).
    pub distance: f32,
}

/// Compute the squared Euclidean distance between two vectors of equal length.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
