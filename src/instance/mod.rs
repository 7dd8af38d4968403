//! Problem instances: cities, the distance matrix and their validation.

mod city;
mod matrix;
mod problem;

pub use city::City;
pub use matrix::{DistanceMatrix, SYMMETRY_TOLERANCE};
pub use problem::ProblemInstance;
