//! Error types for instance validation and annealing configuration.
//!
//! All errors are raised before any annealing begins. A run that has been
//! constructed successfully never fails; it only terminates.

/// A problem instance failed validation.
#[derive(Debug, Clone, PartialEq)]
pub enum InstanceError {
    /// Fewer than two cities were supplied.
    TooFewCities {
        /// Number of cities found.
        count: usize,
    },
    /// A matrix row does not have as many entries as there are rows.
    NotSquare {
        /// Index of the offending row.
        row: usize,
        /// Length of that row.
        len: usize,
        /// Expected row length (number of rows).
        expected: usize,
    },
    /// An entry is NaN or infinite.
    NonFinite {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
    },
    /// An entry is negative.
    Negative {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
        /// The offending value.
        value: f64,
    },
    /// A diagonal entry is not zero.
    NonZeroDiagonal {
        /// Row (and column) index.
        i: usize,
        /// The offending value.
        value: f64,
    },
    /// `D[i][j]` and `D[j][i]` differ by more than the symmetry tolerance.
    Asymmetric {
        /// Row index.
        i: usize,
        /// Column index.
        j: usize,
    },
    /// The city list and the distance matrix disagree on the city count.
    CityCountMismatch {
        /// Number of cities in the list.
        cities: usize,
        /// Dimension of the matrix.
        matrix: usize,
    },
}

impl std::fmt::Display for InstanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceError::TooFewCities { count } => {
                write!(f, "instance needs at least 2 cities, got {count}")
            }
            InstanceError::NotSquare { row, len, expected } => write!(
                f,
                "distance matrix is not square: row {row} has {len} entries, expected {expected}"
            ),
            InstanceError::NonFinite { i, j } => {
                write!(f, "distance D[{i}][{j}] is not finite")
            }
            InstanceError::Negative { i, j, value } => {
                write!(f, "distance D[{i}][{j}] = {value} is negative")
            }
            InstanceError::NonZeroDiagonal { i, value } => {
                write!(f, "diagonal entry D[{i}][{i}] = {value} must be zero")
            }
            InstanceError::Asymmetric { i, j } => {
                write!(f, "distance matrix is not symmetric at ({i}, {j})")
            }
            InstanceError::CityCountMismatch { cities, matrix } => write!(
                f,
                "city list has {cities} cities but distance matrix is {matrix}x{matrix}"
            ),
        }
    }
}

impl std::error::Error for InstanceError {}

/// Annealing parameters are invalid, unresolvable or contradictory.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A temperature is zero, negative or not finite.
    InvalidTemperature {
        /// Which temperature (`"start"` or `"stop"`).
        name: &'static str,
        /// The offending value.
        value: f64,
    },
    /// The stop temperature is not strictly below the start temperature.
    StopNotBelowStart {
        /// Start temperature (supplied or estimated).
        start: f64,
        /// Stop temperature.
        stop: f64,
    },
    /// The cooling ratio lies outside (0, 1).
    InvalidAlpha(f64),
    /// The epoch budget is zero.
    ZeroEpochs,
    /// Alpha has to be derived from the epoch budget, which needs at least two epochs.
    TooFewEpochs(usize),
    /// Stop temperature, alpha and epochs were all supplied.
    OverDetermined,
    /// The initial epoch length is zero.
    ZeroEpochLength,
    /// The epoch length growth factor is not a positive finite number.
    InvalidEpochLengthFactor(f64),
    /// The no-improvement stopping count is zero.
    ZeroStoppingCount,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidTemperature { name, value } => {
                write!(f, "{name} temperature must be positive and finite, got {value}")
            }
            ConfigError::StopNotBelowStart { start, stop } => write!(
                f,
                "stop temperature {stop} must be below start temperature {start}"
            ),
            ConfigError::InvalidAlpha(alpha) => {
                write!(f, "alpha must be in (0, 1), got {alpha}")
            }
            ConfigError::ZeroEpochs => write!(f, "epochs must be at least 1"),
            ConfigError::TooFewEpochs(epochs) => write!(
                f,
                "deriving alpha from the stop temperature needs at least 2 epochs, got {epochs}"
            ),
            ConfigError::OverDetermined => write!(
                f,
                "stop temperature, alpha and epochs cannot all be given; leave one unset"
            ),
            ConfigError::ZeroEpochLength => write!(f, "initial epoch length must be at least 1"),
            ConfigError::InvalidEpochLengthFactor(factor) => write!(
                f,
                "epoch length factor must be positive and finite, got {factor}"
            ),
            ConfigError::ZeroStoppingCount => write!(f, "stopping count must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Any failure raised while constructing an annealing run.
#[derive(Debug, Clone, PartialEq)]
pub enum AnnealError {
    /// The problem instance is invalid.
    Instance(InstanceError),
    /// The configuration is invalid.
    Config(ConfigError),
}

impl std::fmt::Display for AnnealError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnnealError::Instance(e) => write!(f, "invalid instance: {e}"),
            AnnealError::Config(e) => write!(f, "invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for AnnealError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnnealError::Instance(e) => Some(e),
            AnnealError::Config(e) => Some(e),
        }
    }
}

impl From<InstanceError> for AnnealError {
    fn from(e: InstanceError) -> Self {
        AnnealError::Instance(e)
    }
}

impl From<ConfigError> for AnnealError {
    fn from(e: ConfigError) -> Self {
        AnnealError::Config(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_indices() {
        let e = InstanceError::Asymmetric { i: 1, j: 3 };
        assert_eq!(e.to_string(), "distance matrix is not symmetric at (1, 3)");
    }

    #[test]
    fn test_anneal_error_source() {
        use std::error::Error;
        let e: AnnealError = ConfigError::InvalidAlpha(1.5).into();
        assert!(e.source().is_some());
        assert!(e.to_string().contains("alpha"));
    }
}
