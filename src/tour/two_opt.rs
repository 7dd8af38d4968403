//! 2-opt move generation and constant-time delta evaluation.
//!
//! # Algorithm
//!
//! A move `(i, j)` with `0 < i < j < n` reverses the tour segment
//! `order[i..=j]`. Only two edges change:
//!
//! ```text
//! before = d(order[i-1], order[i]) + d(order[j], order[j+1])
//! after  = d(order[i-1], order[j]) + d(order[i], order[j+1])
//! delta  = after - before
//! ```
//!
//! with `j+1` taken modulo n. Negative delta means a shorter tour.
//! Position 0 is never moved, which fixes the tour's origin.
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use super::state::Tour;
use crate::instance::DistanceMatrix;
use rand::Rng;

/// A candidate 2-opt move over tour positions `i < j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoOptMove {
    i: usize,
    j: usize,
}

impl TwoOptMove {
    /// Creates a move, returning `None` unless `0 < i < j < n`.
    pub fn new(i: usize, j: usize, n: usize) -> Option<Self> {
        if i == 0 || i >= j || j >= n {
            return None;
        }
        Some(Self { i, j })
    }

    /// Draws a move uniformly: two distinct positions from `1..n`,
    /// resampling the second on collision, ordered so that `i < j`.
    ///
    /// Returns `None` when `n < 3`, where no valid move exists.
    pub fn random<R: Rng>(rng: &mut R, n: usize) -> Option<Self> {
        if n < 3 {
            return None;
        }
        let a = rng.random_range(1..n);
        let mut b = rng.random_range(1..n);
        while a == b {
            b = rng.random_range(1..n);
        }
        Some(Self {
            i: a.min(b),
            j: a.max(b),
        })
    }

    /// First (lower) position of the reversed segment.
    pub fn i(&self) -> usize {
        self.i
    }

    /// Last (upper) position of the reversed segment.
    pub fn j(&self) -> usize {
        self.j
    }

    /// Change in tour length if this move were applied. Four lookups,
    /// independent of the tour size.
    #[inline]
    pub fn delta(&self, tour: &Tour, matrix: &DistanceMatrix) -> f64 {
        let order = tour.order();
        let edges = tour.edge_lengths();
        let n = order.len();
        let (i, j) = (self.i, self.j);

        let before = edges[i - 1] + edges[j];
        let after = matrix.get(order[i - 1], order[j]) + matrix.get(order[i], order[(j + 1) % n]);
        after - before
    }
}
