//! The validated problem instance handed to the annealer.

use super::city::City;
use super::matrix::DistanceMatrix;
use crate::error::InstanceError;

/// A symmetric TSP instance: a distance matrix and, optionally, the cities
/// it was built from.
///
/// Constructed once by the caller and borrowed read-only by every run.
///
/// # Examples
///
/// ```
/// use u_satsp::instance::{City, ProblemInstance};
///
/// let instance = ProblemInstance::from_cities(vec![
///     City::new(10, 0.0, 0.0),
///     City::new(20, 1.0, 0.0),
///     City::new(30, 1.0, 1.0),
/// ])
/// .unwrap();
/// assert_eq!(instance.len(), 3);
/// assert_eq!(instance.label(2), 30);
/// ```
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    matrix: DistanceMatrix,
    cities: Option<Vec<City>>,
}

impl ProblemInstance {
    /// Wraps a validated distance matrix. Cities are labelled `1..=n`.
    pub fn from_matrix(matrix: DistanceMatrix) -> Result<Self, InstanceError> {
        check_count(matrix.size())?;
        Ok(Self {
            matrix,
            cities: None,
        })
    }

    /// Validates explicit rows and wraps them.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, InstanceError> {
        Self::from_matrix(DistanceMatrix::from_rows(rows)?)
    }

    /// Builds a Euclidean instance from city coordinates.
    pub fn from_cities(cities: Vec<City>) -> Result<Self, InstanceError> {
        check_count(cities.len())?;
        let matrix = DistanceMatrix::from_cities(&cities)?;
        Ok(Self {
            matrix,
            cities: Some(cities),
        })
    }

    /// Pairs a precomputed matrix with the cities used to label the tour.
    pub fn with_cities(matrix: DistanceMatrix, cities: Vec<City>) -> Result<Self, InstanceError> {
        if cities.len() != matrix.size() {
            return Err(InstanceError::CityCountMismatch {
                cities: cities.len(),
                matrix: matrix.size(),
            });
        }
        check_count(cities.len())?;
        Ok(Self {
            matrix,
            cities: Some(cities),
        })
    }

    /// Number of cities.
    pub fn len(&self) -> usize {
        self.matrix.size()
    }

    /// Always `false`: a valid instance has at least two cities.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }

    pub fn cities(&self) -> Option<&[City]> {
        self.cities.as_deref()
    }

    /// External label of the city at matrix index `index`: its id when a
    /// city list is present, otherwise the 1-based index.
    pub fn label(&self, index: usize) -> usize {
        match &self.cities {
            Some(cities) => cities[index].id,
            None => index + 1,
        }
    }

    /// Labels for every city of a tour, in tour order.
    pub fn labels(&self, order: &[usize]) -> Vec<usize> {
        order.iter().map(|&i| self.label(i)).collect()
    }
}

fn check_count(count: usize) -> Result<(), InstanceError> {
    if count < 2 {
        return Err(InstanceError::TooFewCities { count });
    }
    Ok(())
}
