//! Errors for the IPW DiD estimator (input validation, estimation failures,
//! degenerate cells, and bootstrap control flow).
//!
//! [`DidError`] implements `Display`/`Error` and, with the
//! `python-bindings` feature, converts to a Python `ValueError`.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy).
//! - Validation errors are raised before any model fitting.
//! - Propensity-score failures are normalized through
//!   `From<PropensityError>`.
use crate::{did::att::Cell, propensity::errors::PropensityError};
#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};
use statrs::StatsError;

/// Result alias for estimator operations.
pub type DidResult<T> = Result<T, DidError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DidError {
    // ---- Input validation ----
    /// No observations.
    EmptyData,

    /// An input array does not have one entry per observation.
    LengthMismatch { name: &'static str, expected: usize, actual: usize },

    /// The covariate matrix has no columns.
    NoCovariateColumns,

    /// An input value is NaN or ±∞.
    NonFiniteValue { name: &'static str, index: usize, value: f64 },

    /// A 0/1 indicator holds some other value.
    NonBinaryIndicator { name: &'static str, index: usize, value: f64 },

    /// Observation weights must be non-negative.
    NegativeWeight { index: usize, value: f64 },

    /// Observation weights sum to zero, so they cannot be normalized.
    ZeroWeightSum,

    NoTreatedUnits,
    NoControlUnits,
    NoPostPeriod,
    NoPrePeriod,

    /// A group-period combination has no units.
    EmptyCell { cell: Cell },

    /// Trimming level must be finite and in [0, 1].
    InvalidTrimLevel { value: f64 },

    /// Bootstrap needs at least one replicate.
    InvalidReplicates { nboot: usize },

    /// `boot_type` is neither `weighted` nor `multiplier`.
    InvalidBootType { value: String },

    // ---- Estimation ----
    /// Propensity coefficients are NaN or ±∞.
    NonFiniteCoefficients { index: usize, value: f64 },

    /// The propensity design is rank deficient.
    SingularDesign { rank: usize, dim: usize },

    /// Other estimation failure (solver backend, distribution setup).
    Estimation { reason: String },

    // ---- Weights ----
    /// A group-period cell has zero total weight.
    DegenerateWeights { cell: Cell },

    // ---- Bootstrap ----
    /// The caller aborted the bootstrap.
    Cancelled,

    /// Every bootstrap replicate was non-finite.
    NoValidReplicates { nboot: usize },
}

impl std::error::Error for DidError {}

impl std::fmt::Display for DidError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Input validation ----
            DidError::EmptyData => write!(f, "Input data contains no observations."),
            DidError::LengthMismatch { name, expected, actual } => {
                write!(f, "{name} has length {actual}; expected {expected}.")
            }
            DidError::NoCovariateColumns => write!(f, "Covariate matrix has no columns."),
            DidError::NonFiniteValue { name, index, value } => {
                write!(f, "{name}[{index}] is not finite: {value}.")
            }
            DidError::NonBinaryIndicator { name, index, value } => {
                write!(f, "{name}[{index}] must be 0 or 1, found {value}.")
            }
            DidError::NegativeWeight { index, value } => {
                write!(f, "i_weights must be non-negative (i_weights[{index}] = {value}).")
            }
            DidError::ZeroWeightSum => write!(f, "i_weights sum to zero."),
            DidError::NoTreatedUnits => {
                write!(f, "No treated units found. Cannot estimate treatment effect.")
            }
            DidError::NoControlUnits => {
                write!(f, "No control units found. Cannot estimate treatment effect.")
            }
            DidError::NoPostPeriod => write!(f, "No post-treatment observations found."),
            DidError::NoPrePeriod => write!(f, "No pre-treatment observations found."),
            DidError::EmptyCell { cell } => {
                write!(f, "No observations in the {cell} cell. Cannot estimate treatment effect.")
            }
            DidError::InvalidTrimLevel { value } => {
                write!(f, "trim_level must be finite and within [0, 1], found {value}.")
            }
            DidError::InvalidReplicates { nboot } => {
                write!(f, "nboot must be positive when boot is enabled, found {nboot}.")
            }
            DidError::InvalidBootType { value } => {
                write!(f, "boot_type must be 'weighted' or 'multiplier', found '{value}'.")
            }

            // ---- Estimation ----
            DidError::NonFiniteCoefficients { index, value } => {
                write!(
                    f,
                    "Propensity score model coefficients have NA components (coefficient {index} = {value}). \
                     Multicollinearity (or lack of variation) of covariates is a likely reason."
                )
            }
            DidError::SingularDesign { rank, dim } => {
                write!(
                    f,
                    "Failed to estimate propensity scores due to singular matrix (rank {rank} of {dim})."
                )
            }
            DidError::Estimation { reason } => write!(f, "Estimation failed: {reason}"),

            // ---- Weights ----
            DidError::DegenerateWeights { cell } => {
                write!(f, "Weights for the {cell} cell sum to zero; the cell mean is undefined.")
            }

            // ---- Bootstrap ----
            DidError::Cancelled => write!(f, "Bootstrap cancelled by caller."),
            DidError::NoValidReplicates { nboot } => {
                write!(f, "None of the {nboot} bootstrap replicates is finite.")
            }
        }
    }
}

impl From<PropensityError> for DidError {
    fn from(err: PropensityError) -> Self {
        match err {
            PropensityError::NonFiniteCoefficients { index, value } => {
                DidError::NonFiniteCoefficients { index, value }
            }
            PropensityError::SingularDesign { rank, dim } => DidError::SingularDesign { rank, dim },
            other => DidError::Estimation { reason: other.to_string() },
        }
    }
}

impl From<StatsError> for DidError {
    fn from(err: StatsError) -> Self {
        DidError::Estimation { reason: err.to_string() }
    }
}

#[cfg(feature = "python-bindings")]
impl std::convert::From<DidError> for PyErr {
    fn from(err: DidError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Propensity failures keep their structure when crossing into the
    // estimator's error type.
    //
    // Given
    // -----
    // - `PropensityError::SingularDesign` and a wrapped optimizer error.
    //
    // Expect
    // ------
    // - `DidError::SingularDesign` with the same rank/dim; the optimizer
    //   error becomes `Estimation` carrying its message.
    fn from_propensity_error_preserves_estimation_kind() {
        assert_eq!(
            DidError::from(PropensityError::SingularDesign { rank: 1, dim: 2 }),
            DidError::SingularDesign { rank: 1, dim: 2 }
        );
        let wrapped = DidError::from(PropensityError::Optimization {
            source: crate::optimization::errors::OptError::MissingThetaHat,
        });
        assert!(matches!(wrapped, DidError::Estimation { ref reason } if reason.contains("theta hat")));
    }
}
