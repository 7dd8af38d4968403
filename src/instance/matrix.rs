//! Dense symmetric distance matrix.

use super::city::City;
use crate::error::InstanceError;

/// Largest allowed difference between `D[i][j]` and `D[j][i]`.
pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// A validated n×n distance matrix stored in row-major order.
///
/// Every entry is finite and non-negative, the diagonal is zero and the
/// matrix is symmetric within [`SYMMETRY_TOLERANCE`]. The matrix is never
/// mutated after construction.
///
/// # Examples
///
/// ```
/// use u_satsp::instance::DistanceMatrix;
///
/// let dm = DistanceMatrix::from_rows(vec![
///     vec![0.0, 3.0, 4.0],
///     vec![3.0, 0.0, 5.0],
///     vec![4.0, 5.0, 0.0],
/// ])
/// .unwrap();
/// assert_eq!(dm.size(), 3);
/// assert_eq!(dm.get(1, 2), 5.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    data: Vec<f64>,
    size: usize,
}

impl DistanceMatrix {
    /// Builds a matrix from explicit rows, validating every entry.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, InstanceError> {
        let size = rows.len();
        let mut data = Vec::with_capacity(size * size);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != size {
                return Err(InstanceError::NotSquare {
                    row,
                    len: values.len(),
                    expected: size,
                });
            }
            data.extend(values);
        }
        let dm = Self { data, size };
        dm.validate()?;
        Ok(dm)
    }

    /// Computes Euclidean distances between city coordinates.
    ///
    /// With the `parallel` feature, rows are computed on the rayon pool.
    /// Fails if a coordinate is not finite.
    pub fn from_cities(cities: &[City]) -> Result<Self, InstanceError> {
        let size = cities.len();
        let row = |i: usize| -> Vec<f64> {
            cities
                .iter()
                .map(|other| cities[i].distance_to(other))
                .collect()
        };

        #[cfg(feature = "parallel")]
        let rows: Vec<Vec<f64>> = {
            use rayon::prelude::*;
            (0..size).into_par_iter().map(row).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let rows: Vec<Vec<f64>> = (0..size).map(row).collect();

        let dm = Self {
            data: rows.into_iter().flatten().collect(),
            size,
        };
        dm.validate()?;
        Ok(dm)
    }

    fn validate(&self) -> Result<(), InstanceError> {
        for i in 0..self.size {
            for j in 0..self.size {
                let d = self.get(i, j);
                if !d.is_finite() {
                    return Err(InstanceError::NonFinite { i, j });
                }
                if d < 0.0 {
                    return Err(InstanceError::Negative { i, j, value: d });
                }
            }
            let diag = self.get(i, i);
            if diag != 0.0 {
                return Err(InstanceError::NonZeroDiagonal { i, value: diag });
            }
        }
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > SYMMETRY_TOLERANCE {
                    return Err(InstanceError::Asymmetric { i, j });
                }
            }
        }
        Ok(())
    }

    /// Returns the distance between cities `from` and `to`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[inline]
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * self.size + to]
    }

    /// Number of cities.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns `true` if the matrix is symmetric within the given tolerance.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        for i in 0..self.size {
            for j in (i + 1)..self.size {
                if (self.get(i, j) - self.get(j, i)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    /// Length of the closed tour visiting `order` and returning to its start.
    pub fn tour_length(&self, order: &[usize]) -> f64 {
        let n = order.len();
        (0..n).map(|k| self.get(order[k], order[(k + 1) % n])).sum()
    }
}
