//! Temperature schedule: start-temperature estimation, parameter
//! resolution and per-epoch geometric cooling.
//!
//! # Start temperature
//!
//! A reduced tour over at most [`TEMPERATURE_SAMPLE_SIZE`] cities is probed
//! with random 2-opt moves. With `avg` the mean delta of the downhill
//! probes (negative), the start temperature is
//!
//! ```text
//! T0 = avg / ln(TARGET_ACCEPTANCE)
//! ```
//!
//! so that an uphill move of the same magnitude is accepted with
//! probability `TARGET_ACCEPTANCE` in the first epoch.
//!
//! # Cooling
//!
//! `T_{k+1} = alpha * T_k` and
//! `L_{k+1} = min(round(factor * L_k), n(n-1)/2)`, once per epoch.

use super::config::{
    AnnealConfig, DEFAULT_ALPHA, FALLBACK_START_TEMPERATURE, MAX_INITIAL_EPOCH_LENGTH,
};
use crate::error::ConfigError;
use crate::instance::DistanceMatrix;
use crate::tour::{Tour, TwoOptMove};
use rand::Rng;

/// Most cities sampled for the start-temperature estimate.
pub const TEMPERATURE_SAMPLE_SIZE: usize = 50;

/// Most probe moves evaluated for the start-temperature estimate.
pub const TEMPERATURE_SAMPLE_TRIALS: usize = 100;

/// Acceptance probability targeted for an average-sized uphill move at the
/// start temperature.
pub const TARGET_ACCEPTANCE: f64 = 0.9;

// Absorbs rounding in log_alpha before flooring, so exact powers land on
// the intended epoch count.
const EPOCH_ROUNDING_SLACK: f64 = 1e-9;

/// Number of unordered city pairs, `n(n-1)/2`; the epoch length cap.
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Estimates a start temperature by probing random 2-opt moves on a sample
/// of cities.
///
/// Cities are sampled without replacement when there are more than
/// [`TEMPERATURE_SAMPLE_SIZE`]; otherwise all cities are used in index
/// order. Probes are evaluated but never applied. Returns
/// [`FALLBACK_START_TEMPERATURE`] when no probe is downhill.
pub fn estimate_start_temperature<R: Rng>(matrix: &DistanceMatrix, rng: &mut R) -> f64 {
    let n = matrix.size();
    let sample: Vec<usize> = if n > TEMPERATURE_SAMPLE_SIZE {
        rand::seq::index::sample(rng, n, TEMPERATURE_SAMPLE_SIZE).into_vec()
    } else {
        (0..n).collect()
    };
    let m = sample.len();
    let tour = Tour::from_order(sample, matrix);

    let trials = TEMPERATURE_SAMPLE_TRIALS.min(pair_count(m));
    let mut downhill_sum = 0.0;
    let mut downhill_count = 0usize;
    for _ in 0..trials {
        let Some(mv) = TwoOptMove::random(rng, m) else {
            break;
        };
        let delta = mv.delta(&tour, matrix);
        if delta < 0.0 {
            downhill_sum += delta;
            downhill_count += 1;
        }
    }

    if downhill_count == 0 {
        tracing::debug!(
            sample = m,
            trials,
            fallback = FALLBACK_START_TEMPERATURE,
            "no downhill probe, using fallback start temperature"
        );
        return FALLBACK_START_TEMPERATURE;
    }
    (downhill_sum / downhill_count as f64) / TARGET_ACCEPTANCE.ln()
}

/// Mutable schedule state of a run: temperature and epoch length.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    start_temperature: f64,
    temperature: f64,
    alpha: f64,
    epoch_length: usize,
    epoch_length_factor: f64,
    epoch_length_cap: usize,
}

impl Schedule {
    /// Resolves the schedule for `n` cities from a validated configuration
    /// and a start temperature (supplied or estimated).
    ///
    /// Returns the schedule and the epoch budget, which is `None` when no
    /// budget can be derived and the run must stop on stagnation instead.
    pub fn resolve(
        config: &AnnealConfig,
        n: usize,
        start_temperature: f64,
    ) -> Result<(Self, Option<usize>), ConfigError> {
        let start = start_temperature;
        if !(start.is_finite() && start > 0.0) {
            return Err(ConfigError::InvalidTemperature {
                name: "start",
                value: start,
            });
        }
        if let Some(stop) = config.stop_temperature {
            if stop >= start {
                return Err(ConfigError::StopNotBelowStart { start, stop });
            }
        }

        let mut alpha = config.alpha;
        let mut epochs = config.epochs;

        match (config.stop_temperature, alpha, epochs) {
            (Some(stop), None, Some(e)) => {
                if e <= 1 {
                    return Err(ConfigError::TooFewEpochs(e));
                }
                alpha = Some((stop / start).powf(1.0 / (e - 1) as f64));
            }
            (Some(stop), Some(a), None) => {
                let steps = ((stop / start).ln() / a.ln() + EPOCH_ROUNDING_SLACK).floor();
                epochs = Some((steps as usize).saturating_add(1));
            }
            _ => {}
        }

        let alpha = alpha.unwrap_or(DEFAULT_ALPHA);
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ConfigError::InvalidAlpha(alpha));
        }

        let cap = pair_count(n).max(1);
        let epoch_length = config
            .initial_epoch_length
            .unwrap_or(MAX_INITIAL_EPOCH_LENGTH.min(cap))
            .clamp(1, cap);

        let schedule = Self {
            start_temperature: start,
            temperature: start,
            alpha,
            epoch_length,
            epoch_length_factor: config.epoch_length_factor,
            epoch_length_cap: cap,
        };
        Ok((schedule, epochs))
    }

    /// Cools the temperature and grows the epoch length. Called once at
    /// the end of every completed epoch.
    pub fn advance(&mut self) {
        self.temperature *= self.alpha;
        let grown = (self.epoch_length_factor * self.epoch_length as f64).round();
        self.epoch_length = if grown >= self.epoch_length_cap as f64 {
            self.epoch_length_cap
        } else {
            (grown as usize).max(1)
        };
    }

    pub fn start_temperature(&self) -> f64 {
        self.start_temperature
    }

    /// Temperature of the current epoch.
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Trials in the current epoch.
    pub fn epoch_length(&self) -> usize {
        self.epoch_length
    }

    pub fn epoch_length_factor(&self) -> f64 {
        self.epoch_length_factor
    }

    pub fn epoch_length_cap(&self) -> usize {
        self.epoch_length_cap
    }
}
