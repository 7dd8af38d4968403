//! One-call solving: construct a run, anneal, label the best tour.

use crate::anneal::{AnnealConfig, AnnealResult, Annealer};
use crate::error::AnnealError;
use crate::instance::ProblemInstance;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Outcome of [`solve`]: the run result plus the best tour in external labels.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Solution {
    /// Raw annealing result (city indices, statistics, history).
    pub result: AnnealResult,
    /// Best tour as city ids, or 1-based indices without a city list.
    pub labels: Vec<usize>,
}

impl Solution {
    /// Length of the best tour.
    pub fn length(&self) -> f64 {
        self.result.length
    }
}

/// Solves a TSP instance with simulated annealing.
///
/// # Examples
///
/// ```
/// use u_satsp::anneal::AnnealConfig;
/// use u_satsp::instance::ProblemInstance;
/// use u_satsp::solver::solve;
///
/// let instance = ProblemInstance::from_rows(vec![
///     vec![0.0, 1.0, 2.0],
///     vec![1.0, 0.0, 1.0],
///     vec![2.0, 1.0, 0.0],
/// ])
/// .unwrap();
/// let solution = solve(&instance, &AnnealConfig::default().with_seed(1)).unwrap();
/// assert!((solution.length() - 4.0).abs() < 1e-9);
/// assert_eq!(solution.labels[0], 1);
/// ```
pub fn solve(instance: &ProblemInstance, config: &AnnealConfig) -> Result<Solution, AnnealError> {
    solve_with_cancel(instance, config, None)
}

/// Like [`solve`], but returns the best tour found so far once `cancel` is set.
pub fn solve_with_cancel(
    instance: &ProblemInstance,
    config: &AnnealConfig,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<Solution, AnnealError> {
    let mut annealer = Annealer::new(instance, config)?;
    annealer.run_with_cancel(cancel);

    let result = annealer.into_result();
    let labels = instance.labels(&result.tour);
    if config.verbose {
        tracing::info!(
            length = result.length,
            epochs = result.epochs,
            status = %result.status,
            tour = ?labels,
            "best tour"
        );
    }
    Ok(Solution { result, labels })
}
