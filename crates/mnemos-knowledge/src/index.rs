// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exact nearest-neighbour index over fixed-dimension vectors.
//!
//! Vectors are stored row-major in one buffer and searched by brute force.
//! Results are exact, so search is deterministic for a given state: ties in
//! distance are broken by ascending id.

use std::cmp::Ordering;

use mnemos_core::MnemosError;
use mnemos_storage::StoredIndex;

/// Append-only flat L2 index. Row `i` belongs to fact `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Rebuild from a decoded index file.
    pub fn from_stored(stored: StoredIndex) -> Self {
        Self {
            dimension: stored.dimension,
            data: stored.data,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Raw row-major buffer, as written to disk.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Append a vector and return its id.
    pub fn add(&mut self, vector: &[f32]) -> Result<usize, MnemosError> {
        if vector.len() != self.dimension {
            return Err(MnemosError::InvalidInput(format!(
                "vector has dimension {}, index expects {}",
                vector.len(),
                self.dimension
            )));
        }
        let id = self.len();
        self.data.extend_from_slice(vector);
        Ok(id)
    }

    /// The `k` nearest rows to `query` as `(id, squared distance)`, closest first.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        if k == 0 || query.len() != self.dimension || self.dimension == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(id, row)| (id, squared_l2(query, row)))
            .collect();

        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);
        scored
    }
}

/// Squared Euclidean distance between equal-length vectors.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(rows: &[[f32; 2]]) -> FlatIndex {
        let mut index = FlatIndex::new(2);
        for row in rows {
            index.add(row).unwrap();
        }
        index
    }

    #[test]
    fn returns_nearest_first() {
        let index = index_of(&[[0.0, 0.0], [10.0, 10.0], [1.0, 1.0]]);
        let hits = index.search(&[0.9, 0.9], 2);
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![2, 0]);
    }

    #[test]
    fn ties_break_by_id() {
        let index = index_of(&[[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0]]);
        let hits = index.search(&[0.0, 0.0], 3);
        assert_eq!(hits.iter().map(|h| h.0).collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn k_larger_than_len_returns_everything() {
        let index = index_of(&[[1.0, 0.0], [0.0, 1.0]]);
        assert_eq!(index.search(&[0.0, 0.0], 10).len(), 2);
        assert!(index.search(&[0.0, 0.0], 0).is_empty());
    }

    #[test]
    fn rejects_wrong_dimension() {
        let mut index = FlatIndex::new(3);
        assert!(matches!(
            index.add(&[1.0, 2.0]),
            Err(MnemosError::InvalidInput(_))
        ));
        assert!(index.is_empty());
        assert!(index.search(&[1.0], 1).is_empty());
    }

    #[test]
    fn squared_l2_of_unit_axes_is_two() {
        assert!((squared_l2(&[1.0, 0.0], &[0.0, 1.0]) - 2.0).abs() < f32::EPSILON);
    }
}
