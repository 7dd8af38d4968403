//! Tour state with cached edge lengths.

use super::two_opt::TwoOptMove;
use crate::instance::DistanceMatrix;

/// A closed tour over all cities.
///
/// `edge_lengths[k]` caches `D[order[k]][order[(k + 1) % n]]` and
/// `total_length` is their running sum, kept up to date by the exact move
/// delta rather than recomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    order: Vec<usize>,
    edge_lengths: Vec<f64>,
    total_length: f64,
}

impl Tour {
    /// The identity tour `0, 1, ..., n-1`.
    pub fn identity(matrix: &DistanceMatrix) -> Self {
        Self::from_order((0..matrix.size()).collect(), matrix)
    }

    /// A tour visiting the given cities in the given order.
    ///
    /// `order` need not cover every city of the matrix; the initial
    /// temperature estimate runs on such a reduced tour.
    pub fn from_order(order: Vec<usize>, matrix: &DistanceMatrix) -> Self {
        let n = order.len();
        let edge_lengths: Vec<f64> = (0..n)
            .map(|k| matrix.get(order[k], order[(k + 1) % n]))
            .collect();
        let total_length = edge_lengths.iter().sum();
        Self {
            order,
            edge_lengths,
            total_length,
        }
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn edge_lengths(&self) -> &[f64] {
        &self.edge_lengths
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Number of cities in the tour.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Applies a 2-opt move whose delta was computed by [`TwoOptMove::delta`].
    ///
    /// Reverses `order[i..=j]`. Interior edges keep their lengths (the
    /// matrix is symmetric) and only change position, so their cached
    /// values are reversed in place; the two boundary edges are looked up
    /// again. The total is adjusted by `delta`.
    pub fn apply_two_opt(&mut self, mv: TwoOptMove, delta: f64, matrix: &DistanceMatrix) {
        let n = self.order.len();
        let (i, j) = (mv.i(), mv.j());

        self.order[i..=j].reverse();
        self.edge_lengths[i..j].reverse();
        self.edge_lengths[i - 1] = matrix.get(self.order[i - 1], self.order[i]);
        self.edge_lengths[j] = matrix.get(self.order[j], self.order[(j + 1) % n]);
        self.total_length += delta;
    }

    /// Tour length recomputed from scratch.
    pub fn recomputed_length(&self, matrix: &DistanceMatrix) -> f64 {
        matrix.tour_length(&self.order)
    }

    /// Checks every cached edge and the running total against the matrix.
    ///
    /// Returns the first violated position, or `Err(None)` when only the
    /// total has drifted beyond `tol`.
    pub fn check_consistency(&self, matrix: &DistanceMatrix, tol: f64) -> Result<(), Option<usize>> {
        let n = self.order.len();
        for k in 0..n {
            let expected = matrix.get(self.order[k], self.order[(k + 1) % n]);
            if (self.edge_lengths[k] - expected).abs() > tol {
                return Err(Some(k));
            }
        }
        if (self.total_length - self.recomputed_length(matrix)).abs() > tol {
            return Err(None);
        }
        Ok(())
    }

    /// Owned snapshot of the tour for incumbent tracking.
    pub fn snapshot(&self) -> Incumbent {
        Incumbent {
            order: self.order.clone(),
            length: self.total_length,
        }
    }
}

/// The best tour seen so far, independent of the live tour.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Incumbent {
    /// City indices in tour order.
    pub order: Vec<usize>,
    /// Total tour length.
    pub length: f64,
}
