//! Exact brute-force L2 index.
//!
//! Suitable for corpora in the tens to low thousands of documents.

use super::{squared_l2, Neighbor};
use crate::error::{DocsageError, Result};

/// Flat index storing every embedding contiguously.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimension: usize,
    len: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    /// Build an index over `embeddings`, positions following input order.
    ///
    /// All embeddings must share one dimension. An empty input builds an
    /// empty index.
    pub fn build(embeddings: &[Vec<f32>]) -> Result<Self> {
        let dimension = embeddings.first().map(Vec::len).unwrap_or(0);

        let mut data = Vec::with_capacity(dimension * embeddings.len());
        for embedding in embeddings {
            if embedding.len() != dimension {
                return Err(DocsageError::DimensionMismatch {
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
            data.extend_from_slice(embedding);
        }

        Ok(Self {
            dimension,
            len: embeddings.len(),
            data,
        })
    }

    /// Number of indexed embeddings.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Dimension of the indexed embeddings (0 for an empty index).
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Return the `k` nearest embeddings to `query`, closest first.
    ///
    /// Equal distances keep insertion order. `k` larger than the index
    /// returns every embedding.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if self.is_empty() {
            return Err(DocsageError::EmptyIndex);
        }
        if query.len() != self.dimension {
            return Err(DocsageError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut neighbors: Vec<Neighbor> = (0..self.len)
            .map(|position| {
                let start = position * self.dimension;
                Neighbor {
                    position,
                    distance: squared_l2(query, &self.data[start..start + self.dimension]),
                }
            })
            .collect();

        // Stable sort: ties stay in position order.
        neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        neighbors.truncate(k);

        Ok(neighbors)
    }
}
