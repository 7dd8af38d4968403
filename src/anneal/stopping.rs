//! Stop policies evaluated at the end of every epoch.

use super::runner::RunStatus;

/// Epoch cap used as a safety stop under the no-improvement policy.
pub const UNBOUNDED_EPOCHS: usize = usize::MAX;

/// When an annealing run terminates. Exactly one policy is active per run.
#[derive(Debug, Clone, PartialEq)]
pub enum StopPolicy {
    /// Run exactly `epochs` epochs.
    FixedBudget {
        /// Epoch budget.
        epochs: usize,
    },
    /// Run until `limit` consecutive epochs end without improving the
    /// incumbent, or until `safety_cap` epochs have run.
    NoImprovement {
        /// Non-improving epochs tolerated.
        limit: usize,
        /// Consecutive non-improving epochs so far.
        since_improvement: usize,
        /// Incumbent length at the last improvement.
        best_so_far: f64,
        /// Hard epoch cap.
        safety_cap: usize,
    },
}

impl StopPolicy {
    /// Fixed epoch budget.
    pub fn fixed(epochs: usize) -> Self {
        StopPolicy::FixedBudget { epochs }
    }

    /// No-improvement policy starting from the initial incumbent length.
    pub fn no_improvement(limit: usize, initial_length: f64) -> Self {
        StopPolicy::NoImprovement {
            limit,
            since_improvement: 0,
            best_so_far: initial_length,
            safety_cap: UNBOUNDED_EPOCHS,
        }
    }

    /// Epoch budget, or the safety cap for the no-improvement policy.
    pub fn budget(&self) -> usize {
        match self {
            StopPolicy::FixedBudget { epochs } => *epochs,
            StopPolicy::NoImprovement { safety_cap, .. } => *safety_cap,
        }
    }

    /// Records a completed epoch and returns the terminal status if the
    /// run must stop.
    pub fn observe_epoch(
        &mut self,
        epochs_done: usize,
        incumbent_length: f64,
    ) -> Option<RunStatus> {
        match self {
            StopPolicy::FixedBudget { epochs } => {
                (epochs_done >= *epochs).then_some(RunStatus::Completed)
            }
            StopPolicy::NoImprovement {
                limit,
                since_improvement,
                best_so_far,
                safety_cap,
            } => {
                if incumbent_length < *best_so_far {
                    *best_so_far = incumbent_length;
                    *since_improvement = 0;
                } else {
                    *since_improvement += 1;
                }
                if *since_improvement >= *limit {
                    Some(RunStatus::EarlyStopped)
                } else if epochs_done >= *safety_cap {
                    Some(RunStatus::Completed)
                } else {
                    None
                }
            }
        }
    }
}

impl std::fmt::Display for StopPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopPolicy::FixedBudget { epochs } => write!(f, "after {epochs} epochs"),
            StopPolicy::NoImprovement { limit, .. } => {
                write!(f, "no improvement for {limit} epochs")
            }
        }
    }
}
