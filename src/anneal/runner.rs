//! Annealing execution loop.
//!
//! # Algorithm
//!
//! 1. Build the identity tour; the incumbent starts as a copy of it
//! 2. For every epoch, at the epoch's fixed temperature, run
//!    `epoch_length` trials:
//!    a. Draw a random 2-opt move and evaluate its delta in O(1)
//!    b. Accept it by the Metropolis criterion
//!    c. On acceptance, apply it and replace the incumbent if shorter
//! 3. After every epoch, cool the temperature, grow the epoch length and
//!    consult the stop policy
//!
//! A cancellation flag is polled before every trial. Cancelling leaves the
//! tour untouched and keeps the incumbent.

use super::acceptance::metropolis;
use super::config::AnnealConfig;
use super::schedule::{estimate_start_temperature, Schedule};
use super::stopping::StopPolicy;
use crate::error::AnnealError;
use crate::instance::ProblemInstance;
use crate::tour::{Incumbent, Tour, TwoOptMove};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// Progress goes to `info` when the run is verbose, otherwise to `debug`.
macro_rules! report {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

/// Lifecycle of an annealing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RunStatus {
    /// Constructed, no epoch started yet.
    Initialized,
    /// At least one epoch has started.
    Running,
    /// The epoch budget is exhausted (or no move exists).
    Completed,
    /// The no-improvement limit was reached.
    EarlyStopped,
    /// Cancelled externally.
    Interrupted,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::EarlyStopped | RunStatus::Interrupted
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Initialized => "initialized",
            RunStatus::Running => "running",
            RunStatus::Completed => "completed",
            RunStatus::EarlyStopped => "early stopped",
            RunStatus::Interrupted => "interrupted",
        };
        f.write_str(s)
    }
}

/// Per-epoch samples, one entry per completed epoch.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunHistory {
    /// Temperature the epoch ran at.
    pub temperatures: Vec<f64>,
    /// Current tour length at the end of the epoch.
    pub current_lengths: Vec<f64>,
    /// Incumbent length at the end of the epoch.
    pub best_lengths: Vec<f64>,
}

impl RunHistory {
    fn record(&mut self, temperature: f64, current: f64, best: f64) {
        self.temperatures.push(temperature);
        self.current_lengths.push(current);
        self.best_lengths.push(best);
    }

    /// Number of recorded epochs.
    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }
}

/// Result of an annealing run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealResult {
    /// Best tour found, as city indices.
    pub tour: Vec<usize>,

    /// Length of the best tour.
    pub length: f64,

    /// Number of completed epochs.
    pub epochs: usize,

    /// Status the run ended in.
    pub status: RunStatus,

    /// Start temperature, supplied or estimated.
    pub start_temperature: f64,

    /// Cooling ratio, supplied, derived or defaulted.
    pub alpha: f64,

    /// Temperature the next epoch would have run at.
    pub final_temperature: f64,

    /// Number of evaluated moves.
    pub trials: usize,

    /// Number of accepted moves (including improvements).
    pub accepted_moves: usize,

    /// Number of improving moves.
    pub improving_moves: usize,

    /// Per-epoch temperature and length samples.
    pub history: RunHistory,
}

/// A single annealing run over a borrowed problem instance.
///
/// All mutable state (tour, incumbent, schedule, stop policy, RNG) belongs
/// to this run; independent runs never share it.
///
/// # Examples
///
/// ```
/// use u_satsp::anneal::{AnnealConfig, Annealer};
/// use u_satsp::instance::{City, ProblemInstance};
///
/// let instance = ProblemInstance::from_cities(vec![
///     City::new(1, 0.0, 0.0),
///     City::new(2, 1.0, 1.0),
///     City::new(3, 1.0, 0.0),
///     City::new(4, 0.0, 1.0),
/// ])
/// .unwrap();
/// let config = AnnealConfig::default().with_seed(42);
/// let mut annealer = Annealer::new(&instance, &config).unwrap();
/// annealer.run();
/// assert!((annealer.incumbent_length() - 4.0).abs() < 1e-9);
/// ```
pub struct Annealer<'a> {
    instance: &'a ProblemInstance,
    schedule: Schedule,
    stop: StopPolicy,
    current: Tour,
    incumbent: Incumbent,
    history: RunHistory,
    rng: StdRng,
    status: RunStatus,
    epochs_run: usize,
    trials: usize,
    accepted_moves: usize,
    improving_moves: usize,
    verbose: bool,
}

impl<'a> Annealer<'a> {
    /// Validates the configuration, estimates the start temperature when
    /// needed and resolves the schedule and stop policy.
    pub fn new(
        instance: &'a ProblemInstance,
        config: &AnnealConfig,
    ) -> Result<Self, AnnealError> {
        config.validate()?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };

        let matrix = instance.matrix();
        let start_temperature = match config.start_temperature {
            Some(t) => t,
            None => estimate_start_temperature(matrix, &mut rng),
        };
        let (schedule, epochs) = Schedule::resolve(config, instance.len(), start_temperature)?;

        let current = Tour::identity(matrix);
        let incumbent = current.snapshot();
        let stop = match epochs {
            Some(epochs) => StopPolicy::fixed(epochs),
            None => {
                tracing::debug!(
                    stopping_count = config.stopping_count,
                    "no epoch budget, stopping on stagnation"
                );
                StopPolicy::no_improvement(config.stopping_count, current.total_length())
            }
        };

        report!(
            config.verbose,
            cities = instance.len(),
            start_temperature = schedule.start_temperature(),
            alpha = schedule.alpha(),
            epoch_length = schedule.epoch_length(),
            stop = %stop,
            "simulated annealing starts"
        );

        Ok(Self {
            instance,
            schedule,
            stop,
            current,
            incumbent,
            history: RunHistory::default(),
            rng,
            status: RunStatus::Initialized,
            epochs_run: 0,
            trials: 0,
            accepted_moves: 0,
            improving_moves: 0,
            verbose: config.verbose,
        })
    }

    /// Runs to a terminal state.
    pub fn run(&mut self) -> RunStatus {
        self.run_with_cancel(None)
    }

    /// Runs to a terminal state, stopping early once `cancel` is set.
    pub fn run_with_cancel(&mut self, cancel: Option<Arc<AtomicBool>>) -> RunStatus {
        let cancel = cancel.as_deref();
        loop {
            let status = self.run_epoch(cancel);
            if status.is_terminal() {
                return status;
            }
        }
    }

    /// Runs exactly one epoch, or returns the terminal status unchanged.
    ///
    /// An interrupted epoch is not counted and does not cool the schedule.
    pub fn run_epoch(&mut self, cancel: Option<&AtomicBool>) -> RunStatus {
        if self.status.is_terminal() {
            return self.status;
        }
        if self.current.len() < 3 {
            // A two-city tour has no 2-opt move.
            return self.finish(RunStatus::Completed);
        }
        self.status = RunStatus::Running;

        let temperature = self.schedule.temperature();
        for _ in 0..self.schedule.epoch_length() {
            if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return self.finish(RunStatus::Interrupted);
            }
            self.trial(temperature);
        }

        self.epochs_run += 1;
        self.history.record(
            temperature,
            self.current.total_length(),
            self.incumbent.length,
        );
        report!(
            self.verbose,
            epoch = self.epochs_run,
            temperature,
            epoch_length = self.schedule.epoch_length(),
            current = self.current.total_length(),
            best = self.incumbent.length,
            "epoch completed"
        );

        self.schedule.advance();
        match self.stop.observe_epoch(self.epochs_run, self.incumbent.length) {
            Some(status) => self.finish(status),
            None => self.status,
        }
    }

    fn trial(&mut self, temperature: f64) {
        let instance = self.instance;
        let matrix = instance.matrix();
        let Some(mv) = TwoOptMove::random(&mut self.rng, self.current.len()) else {
            return;
        };
        let delta = mv.delta(&self.current, matrix);
        self.trials += 1;

        if !metropolis(delta, temperature, &mut self.rng) {
            return;
        }
        self.current.apply_two_opt(mv, delta, matrix);
        self.accepted_moves += 1;
        if delta < 0.0 {
            self.improving_moves += 1;
        }
        if self.current.total_length() < self.incumbent.length {
            self.incumbent = self.current.snapshot();
        }
    }

    fn finish(&mut self, status: RunStatus) -> RunStatus {
        self.status = status;
        report!(
            self.verbose,
            epochs = self.epochs_run,
            status = %status,
            best = self.incumbent.length,
            "simulated annealing terminated"
        );
        status
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Best tour found so far.
    pub fn incumbent(&self) -> &Incumbent {
        &self.incumbent
    }

    pub fn incumbent_length(&self) -> f64 {
        self.incumbent.length
    }

    /// The live tour being mutated.
    pub fn current(&self) -> &Tour {
        &self.current
    }

    /// Number of completed epochs.
    pub fn epochs_run(&self) -> usize {
        self.epochs_run
    }

    /// Temperature of the next epoch.
    pub fn temperature(&self) -> f64 {
        self.schedule.temperature()
    }

    /// Trial count of the next epoch.
    pub fn epoch_length(&self) -> usize {
        self.schedule.epoch_length()
    }

    pub fn history(&self) -> &RunHistory {
        &self.history
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn stop_policy(&self) -> &StopPolicy {
        &self.stop
    }

    pub fn instance(&self) -> &'a ProblemInstance {
        self.instance
    }

    /// Snapshot of the run's outcome so far.
    pub fn result(&self) -> AnnealResult {
        AnnealResult {
            tour: self.incumbent.order.clone(),
            length: self.incumbent.length,
            epochs: self.epochs_run,
            status: self.status,
            start_temperature: self.schedule.start_temperature(),
            alpha: self.schedule.alpha(),
            final_temperature: self.schedule.temperature(),
            trials: self.trials,
            accepted_moves: self.accepted_moves,
            improving_moves: self.improving_moves,
            history: self.history.clone(),
        }
    }

    /// Consumes the run and returns its outcome.
    pub fn into_result(self) -> AnnealResult {
        AnnealResult {
            tour: self.incumbent.order,
            length: self.incumbent.length,
            epochs: self.epochs_run,
            status: self.status,
            start_temperature: self.schedule.start_temperature(),
            alpha: self.schedule.alpha(),
            final_temperature: self.schedule.temperature(),
            trials: self.trials,
            accepted_moves: self.accepted_moves,
            improving_moves: self.improving_moves,
            history: self.history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{City, DistanceMatrix};
    use rand::Rng;

    fn crossed_square() -> ProblemInstance {
        // Identity order visits the unit square crosswise.
        ProblemInstance::from_cities(vec![
            City::new(1, 0.0, 0.0),
            City::new(2, 1.0, 1.0),
            City::new(3, 1.0, 0.0),
            City::new(4, 0.0, 1.0),
        ])
        .expect("valid")
    }

    fn random_instance(n: usize, seed: u64) -> ProblemInstance {
        let mut rng = StdRng::seed_from_u64(seed);
        let cities = (0..n)
            .map(|k| {
                let x = rng.random_range(0.0..100.0);
                let y = rng.random_range(0.0..100.0);
                City::new(k, x, y)
            })
            .collect();
        ProblemInstance::from_cities(cities).expect("valid")
    }

    fn uniform_instance(n: usize) -> ProblemInstance {
        let rows = (0..n)
            .map(|i| (0..n).map(|j| if i == j { 0.0 } else { 1.0 }).collect())
            .collect();
        ProblemInstance::from_rows(rows).expect("valid")
    }

    #[test]
    fn test_unit_square_converges_to_perimeter() {
        let instance = crossed_square();
        let config = AnnealConfig::default().with_seed(42);
        let mut annealer = Annealer::new(&instance, &config).expect("valid");
        assert!((annealer.incumbent_length() - (2.0 + 2.0 * 2f64.sqrt())).abs() < 1e-9);

        let status = annealer.run();
        assert_eq!(status, RunStatus::EarlyStopped);
        assert!((annealer.incumbent_length() - 4.0).abs() < 1e-9);
        let order = &annealer.incumbent().order;
        assert!((instance.matrix().tour_length(order) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_two_cities_terminate_immediately() {
        let instance =
            ProblemInstance::from_rows(vec![vec![0.0, 3.5], vec![3.5, 0.0]]).expect("valid");
        let mut annealer = Annealer::new(&instance, &AnnealConfig::default()).expect("valid");
        assert_eq!(annealer.status(), RunStatus::Initialized);
        assert_eq!(annealer.run(), RunStatus::Completed);
        assert_eq!(annealer.epochs_run(), 0);
        assert_eq!(annealer.incumbent().order, vec![0, 1]);
        assert!((annealer.incumbent_length() - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_fixed_budget_runs_exact_epochs() {
        let instance = random_instance(20, 1);
        let config = AnnealConfig::default()
            .with_start_temperature(50.0)
            .with_epochs(37)
            .with_seed(3);
        let mut annealer = Annealer::new(&instance, &config).expect("valid");
        assert_eq!(annealer.run(), RunStatus::Completed);
        assert_eq!(annealer.epochs_run(), 37);
        assert_eq!(annealer.history().len(), 37);
    }

    #[test]
    fn test_derived_alpha_reaches_stop_temperature() {
        let instance = random_instance(15, 2);
        let config = AnnealConfig::default()
            .with_start_temperature(100.0)
            .with_stop_temperature(1.0)
            .with_epochs(21)
            .with_seed(3);
        let mut annealer = Annealer::new(&instance, &config).expect("valid");
        annealer.run();
        let temps = &annealer.history().temperatures;
        assert_eq!(temps.len(), 21);
        assert!((temps[0] - 100.0).abs() < 1e-9);
        assert!((temps[20] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_improvement_stops_after_stopping_count() {
        // Every tour has the same length, so the incumbent never improves.
        let instance = uniform_instance(8);
        let config = AnnealConfig::default()
            .with_stopping_count(12)
            .with_seed(5);
        let mut annealer = Annealer::new(&instance, &config).expect("valid");
        assert_eq!(annealer.run(), RunStatus::EarlyStopped);
        assert_eq!(annealer.epochs_run(), 12);
    }

    #[test]
    fn test_delta_bookkeeping_and_incumbent_monotone() {
        let instance = random_instance(40, 9);
        let config = AnnealConfig::default()
            .with_epochs(60)
            .with_epoch_length_factor(1.05)
            .with_seed(11);
        let mut annealer = Annealer::new(&instance, &config).expect("valid");
        let mut last_best = annealer.incumbent_length();
        while !annealer.run_epoch(None).is_terminal() {
            let current = annealer.current();
            assert!(current.check_consistency(instance.matrix(), 1e-6).is_ok());
            assert!(annealer.incumbent_length() <= current.total_length() + 1e-9);
            assert!(annealer.incumbent_length() <= last_best);
            last_best = annealer.incumbent_length();
        }
        let best = annealer.incumbent();
        assert!((instance.matrix().tour_length(&best.order) - best.length).abs() < 1e-6);
        for w in annealer.history().best_lengths.windows(2) {
            assert!(w[1] <= w[0]);
        }
    }

    #[test]
    fn test_epoch_length_grows_to_cap() {
        let instance = random_instance(6, 4);
        let config = AnnealConfig::default()
            .with_initial_epoch_length(2)
            .with_epoch_length_factor(2.0)
            .with_epochs(10)
            .with_seed(1);
        let mut annealer = Annealer::new(&instance, &config).expect("valid");
        annealer.run();
        assert_eq!(annealer.epoch_length(), 15);
        assert!(annealer.result().trials <= 10 * 15);
    }

    #[test]
    fn test_cancellation_matches_capped_run() {
        let instance = random_instance(30, 21);
        let k = 7;
        let base = AnnealConfig::default()
            .with_start_temperature(200.0)
            .with_alpha(0.9)
            .with_seed(99);

        let long_run = base.clone().with_epochs(50);
        let mut interrupted = Annealer::new(&instance, &long_run).expect("valid");
        for _ in 0..k {
            interrupted.run_epoch(None);
        }
        let cancel = Arc::new(AtomicBool::new(true));
        assert_eq!(
            interrupted.run_with_cancel(Some(cancel)),
            RunStatus::Interrupted
        );
        assert_eq!(interrupted.epochs_run(), k);

        let mut capped = Annealer::new(&instance, &base.with_epochs(k)).expect("valid");
        assert_eq!(capped.run(), RunStatus::Completed);

        assert_eq!(interrupted.incumbent(), capped.incumbent());
        assert_eq!(interrupted.incumbent_length(), capped.incumbent_length());
    }

    #[test]
    fn test_cancel_before_start_keeps_initial_tour() {
        let instance = random_instance(10, 8);
        let mut annealer =
            Annealer::new(&instance, &AnnealConfig::default().with_seed(1)).expect("valid");
        let initial = annealer.incumbent().clone();
        let cancel = Arc::new(AtomicBool::new(true));
        assert_eq!(annealer.run_with_cancel(Some(cancel)), RunStatus::Interrupted);
        assert_eq!(annealer.epochs_run(), 0);
        assert_eq!(annealer.incumbent(), &initial);
        // Terminal states are sticky.
        assert_eq!(annealer.run(), RunStatus::Interrupted);
    }

    #[test]
    fn test_same_seed_same_result() {
        let instance = random_instance(25, 13);
        let config = AnnealConfig::default().with_epochs(30).with_seed(2024);
        let mut a = Annealer::new(&instance, &config).expect("valid");
        let mut b = Annealer::new(&instance, &config).expect("valid");
        a.run();
        b.run();
        assert_eq!(a.result().tour, b.result().tour);
        assert_eq!(a.result().length, b.result().length);
    }

    #[test]
    fn test_improves_random_instance() {
        let instance = random_instance(50, 77);
        let initial = instance.matrix().tour_length(&(0..50).collect::<Vec<_>>());
        let config = AnnealConfig::default()
            .with_stop_temperature(0.01)
            .with_epochs(300)
            .with_seed(7);
        let mut annealer = Annealer::new(&instance, &config).expect("valid");
        annealer.run();
        let result = annealer.into_result();
        assert!(
            result.length < initial * 0.5,
            "expected a large improvement: {} vs {}",
            result.length,
            initial
        );
        assert!(result.improving_moves > 0);
        assert!(result.accepted_moves >= result.improving_moves);
        let mut sorted = result.tour.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_config_errors_surface() {
        let instance = random_instance(5, 1);
        let config = AnnealConfig::default()
            .with_start_temperature(1.0)
            .with_stop_temperature(2.0);
        assert!(matches!(
            Annealer::new(&instance, &config),
            Err(AnnealError::Config(_))
        ));
    }

    #[test]
    fn test_history_records_every_epoch() {
        let dm = DistanceMatrix::from_rows(vec![
            vec![0.0, 2.0, 9.0, 10.0],
            vec![2.0, 0.0, 6.0, 4.0],
            vec![9.0, 6.0, 0.0, 3.0],
            vec![10.0, 4.0, 3.0, 0.0],
        ])
        .expect("valid");
        let instance = ProblemInstance::from_matrix(dm).expect("valid");
        let config = AnnealConfig::default()
            .with_start_temperature(10.0)
            .with_alpha(0.5)
            .with_epochs(5)
            .with_seed(0);
        let mut annealer = Annealer::new(&instance, &config).expect("valid");
        annealer.run();
        let h = annealer.history();
        assert_eq!(h.len(), 5);
        assert_eq!(h.temperatures, vec![10.0, 5.0, 2.5, 1.25, 0.625]);
        for (cur, best) in h.current_lengths.iter().zip(&h.best_lengths) {
            assert!(best <= cur);
        }
    }
}
