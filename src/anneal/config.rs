//! Annealing configuration and its defaults.

use crate::error::ConfigError;

/// Cooling ratio used when none is supplied or derivable.
pub const DEFAULT_ALPHA: f64 = 0.99;

/// Start temperature used when the estimate sees no downhill move.
pub const FALLBACK_START_TEMPERATURE: f64 = 10_000.0;

/// Consecutive non-improving epochs before the no-improvement policy stops.
pub const DEFAULT_STOPPING_COUNT: usize = 100;

/// Epoch length growth per epoch; 1.0 keeps it constant.
pub const DEFAULT_EPOCH_LENGTH_FACTOR: f64 = 1.0;

/// Upper bound on the default initial epoch length.
pub const MAX_INITIAL_EPOCH_LENGTH: usize = 100;

/// Configuration for an annealing run.
///
/// Every parameter is optional; unset parameters are estimated or derived
/// when the run is constructed (see [`crate::anneal::Schedule`]). Exactly one
/// of `alpha` and `epochs` may be left for derivation from `stop_temperature`.
///
/// # Examples
///
/// ```
/// use u_satsp::anneal::AnnealConfig;
///
/// let config = AnnealConfig::default()
///     .with_start_temperature(100.0)
///     .with_stop_temperature(0.01)
///     .with_epochs(500)
///     .with_epoch_length_factor(1.05)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealConfig {
    /// Initial temperature. Estimated from a city sample when `None`.
    pub start_temperature: Option<f64>,

    /// Temperature of the last epoch. Used to derive `alpha` or `epochs`.
    pub stop_temperature: Option<f64>,

    /// Geometric cooling ratio in (0, 1).
    pub alpha: Option<f64>,

    /// Epoch budget. When unresolved, the run stops after
    /// `stopping_count` epochs without improvement.
    pub epochs: Option<usize>,

    /// Trials in the first epoch. Defaults to `min(100, n(n-1)/2)`.
    pub initial_epoch_length: Option<usize>,

    /// Multiplier applied to the epoch length after every epoch.
    pub epoch_length_factor: f64,

    /// Non-improving epochs tolerated by the no-improvement stop policy.
    pub stopping_count: usize,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,

    /// Report parameters and per-epoch progress at `info` level.
    pub verbose: bool,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            start_temperature: None,
            stop_temperature: None,
            alpha: None,
            epochs: None,
            initial_epoch_length: None,
            epoch_length_factor: DEFAULT_EPOCH_LENGTH_FACTOR,
            stopping_count: DEFAULT_STOPPING_COUNT,
            seed: None,
            verbose: false,
        }
    }
}

impl AnnealConfig {
    pub fn with_start_temperature(mut self, t: f64) -> Self {
        self.start_temperature = Some(t);
        self
    }

    pub fn with_stop_temperature(mut self, t: f64) -> Self {
        self.stop_temperature = Some(t);
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = Some(alpha);
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = Some(epochs);
        self
    }

    pub fn with_initial_epoch_length(mut self, n: usize) -> Self {
        self.initial_epoch_length = Some(n);
        self
    }

    pub fn with_epoch_length_factor(mut self, factor: f64) -> Self {
        self.epoch_length_factor = factor;
        self
    }

    pub fn with_stopping_count(mut self, n: usize) -> Self {
        self.stopping_count = n;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Validates the parameters that can be checked without the instance.
    ///
    /// Checks that depend on the start temperature (which may still need
    /// to be estimated) happen during schedule resolution.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(t) = self.start_temperature {
            check_temperature("start", t)?;
        }
        if let Some(t) = self.stop_temperature {
            check_temperature("stop", t)?;
        }
        if let (Some(start), Some(stop)) = (self.start_temperature, self.stop_temperature) {
            if stop >= start {
                return Err(ConfigError::StopNotBelowStart { start, stop });
            }
        }
        if let Some(alpha) = self.alpha {
            if !(alpha > 0.0 && alpha < 1.0) {
                return Err(ConfigError::InvalidAlpha(alpha));
            }
        }
        match self.epochs {
            Some(0) => return Err(ConfigError::ZeroEpochs),
            Some(e) if e <= 1 && self.stop_temperature.is_some() && self.alpha.is_none() => {
                return Err(ConfigError::TooFewEpochs(e));
            }
            _ => {}
        }
        if self.stop_temperature.is_some() && self.alpha.is_some() && self.epochs.is_some() {
            return Err(ConfigError::OverDetermined);
        }
        if self.initial_epoch_length == Some(0) {
            return Err(ConfigError::ZeroEpochLength);
        }
        if !(self.epoch_length_factor.is_finite() && self.epoch_length_factor > 0.0) {
            return Err(ConfigError::InvalidEpochLengthFactor(
                self.epoch_length_factor,
            ));
        }
        if self.stopping_count == 0 {
            return Err(ConfigError::ZeroStoppingCount);
        }
        Ok(())
    }
}

fn check_temperature(name: &'static str, t: f64) -> Result<(), ConfigError> {
    if !(t.is_finite() && t > 0.0) {
        return Err(ConfigError::InvalidTemperature { name, value: t });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnnealConfig::default();
        assert!(config.start_temperature.is_none());
        assert!((config.epoch_length_factor - 1.0).abs() < 1e-15);
        assert_eq!(config.stopping_count, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bad_temperature() {
        let config = AnnealConfig::default().with_start_temperature(-1.0);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidTemperature {
                name: "start",
                value: -1.0
            })
        );
        let config = AnnealConfig::default().with_stop_temperature(f64::INFINITY);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_stop_ge_start() {
        let config = AnnealConfig::default()
            .with_start_temperature(10.0)
            .with_stop_temperature(20.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::StopNotBelowStart { .. })
        ));
    }

    #[test]
    fn test_validate_bad_alpha() {
        for alpha in [0.0, 1.0, 1.5, -0.2, f64::NAN] {
            let config = AnnealConfig::default().with_alpha(alpha);
            assert!(config.validate().is_err(), "alpha {alpha} accepted");
        }
    }

    #[test]
    fn test_validate_epochs() {
        let config = AnnealConfig::default().with_epochs(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroEpochs));

        let config = AnnealConfig::default()
            .with_stop_temperature(1.0)
            .with_epochs(1);
        assert_eq!(config.validate(), Err(ConfigError::TooFewEpochs(1)));

        // One epoch is fine when alpha does not have to be derived.
        assert!(AnnealConfig::default().with_epochs(1).validate().is_ok());
    }

    #[test]
    fn test_validate_over_determined() {
        let config = AnnealConfig::default()
            .with_stop_temperature(1.0)
            .with_alpha(0.9)
            .with_epochs(10);
        assert_eq!(config.validate(), Err(ConfigError::OverDetermined));
    }

    #[test]
    fn test_validate_epoch_length() {
        let config = AnnealConfig::default().with_initial_epoch_length(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroEpochLength));
        let config = AnnealConfig::default().with_epoch_length_factor(0.0);
        assert!(config.validate().is_err());
        let config = AnnealConfig::default().with_stopping_count(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroStoppingCount));
    }
}
