//! Errors for the propensity-score logit (design checks, solver failures,
//! and fitted-coefficient validation).
//!
//! The estimator layer converts [`PropensityError`] into its own error type,
//! so callers of the DiD entry points see these as estimation failures.
use crate::optimization::errors::OptError;

/// Result alias for propensity-score operations.
pub type PropensityResult<T> = Result<T, PropensityError>;

#[derive(Debug, Clone, PartialEq)]
pub enum PropensityError {
    // ---- Design ----
    /// Outcome, weight, and covariate rows disagree in length.
    DimensionMismatch { expected: usize, actual: usize, what: &'static str },

    /// `X' diag(w) X` is numerically rank deficient.
    SingularDesign { rank: usize, dim: usize },

    // ---- Fit ----
    /// A fitted coefficient is NaN or ±∞.
    NonFiniteCoefficients { index: usize, value: f64 },

    /// The L-BFGS backend failed.
    Optimization { source: OptError },
}

impl std::error::Error for PropensityError {}

impl std::fmt::Display for PropensityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Design ----
            PropensityError::DimensionMismatch { expected, actual, what } => {
                write!(f, "Propensity design mismatch for {what}: expected {expected}, actual {actual}")
            }
            PropensityError::SingularDesign { rank, dim } => {
                write!(
                    f,
                    "Propensity design is singular (rank {rank} of {dim}); \
                     multicollinearity or lack of variation in covariates is a likely reason"
                )
            }

            // ---- Fit ----
            PropensityError::NonFiniteCoefficients { index, value } => {
                write!(f, "Propensity score coefficient {index} is not finite: {value}")
            }
            PropensityError::Optimization { source } => {
                write!(f, "Propensity score optimization failed: {source}")
            }
        }
    }
}

impl From<OptError> for PropensityError {
    fn from(source: OptError) -> Self {
        match source {
            OptError::InvalidThetaHat { index, value, .. } => {
                PropensityError::NonFiniteCoefficients { index, value }
            }
            other => PropensityError::Optimization { source: other },
        }
    }
}
