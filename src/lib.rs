//! Travelling Salesman Problem solver using Simulated Annealing.
//!
//! Finds a short closed tour through every city of a symmetric instance
//! with an anytime annealing search over 2-opt moves:
//!
//! - **Instance**: validated distance matrix, optionally built from city
//!   coordinates, plus labels for reporting the tour.
//! - **Tour**: permutation with cached edge lengths, updated in O(1) per
//!   accepted 2-opt move.
//! - **Anneal**: start-temperature estimation, geometric cooling, growing
//!   epoch lengths, Metropolis acceptance, fixed-budget or stagnation stop,
//!   and cooperative cancellation that keeps the best tour found.
//! - **Solver**: one-call wrapper that runs the annealer and labels the
//!   best tour.
//!
//! # Architecture
//!
//! The annealer borrows the instance read-only and owns all other run
//! state, so independent runs never interfere. Progress is reported
//! through `tracing`; no subscriber is installed by this crate.

pub mod anneal;
pub mod error;
pub mod instance;
pub mod solver;
pub mod tour;

pub use error::{AnnealError, ConfigError, InstanceError};
