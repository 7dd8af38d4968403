//! Simulated Annealing over the 2-opt neighborhood.
//!
//! A single-solution trajectory metaheuristic inspired by the physical
//! annealing process. Worsening moves are accepted with a probability that
//! shrinks as the temperature is cooled geometrically epoch by epoch,
//! letting the search escape local optima early and settle late.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Cerny (1985), "Thermodynamical Approach to the Travelling Salesman Problem"
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast
//!   Computing Machines"

mod acceptance;
mod config;
mod runner;
mod schedule;
mod stopping;

pub use acceptance::{metropolis, MAX_ACCEPTANCE_EXPONENT};
pub use config::{
    AnnealConfig, DEFAULT_ALPHA, DEFAULT_EPOCH_LENGTH_FACTOR, DEFAULT_STOPPING_COUNT,
    FALLBACK_START_TEMPERATURE, MAX_INITIAL_EPOCH_LENGTH,
};
pub use runner::{AnnealResult, Annealer, RunHistory, RunStatus};
pub use schedule::{
    estimate_start_temperature, pair_count, Schedule, TARGET_ACCEPTANCE,
    TEMPERATURE_SAMPLE_SIZE, TEMPERATURE_SAMPLE_TRIALS,
};
pub use stopping::{StopPolicy, UNBOUNDED_EPOCHS};
