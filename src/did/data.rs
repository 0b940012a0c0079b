//! Repeated cross-section data container for the IPW DiD estimator.
//!
//! Purpose
//! -------
//! Validate raw inputs once at the boundary so the estimator can assume
//! clean, aligned arrays: outcome `y`, post-period indicator, treated-group
//! indicator, covariates, and observation weights.
//!
//! Key behaviors
//! -------------
//! - Covariates default to a single intercept column; weights default to
//!   ones.
//! - Weights are renormalized to mean 1.
//! - Validation order: shapes and finiteness, indicator coding, negative
//!   weights, presence of treated, control, post, and pre units, then
//!   presence of each group-period cell.
//!
//! Invariants & assumptions
//! ------------------------
//! - All arrays have `n ≥ 1` entries (covariates: `n` rows, `k ≥ 1` columns).
//! - `post` and `d` hold only 0.0 or 1.0.
//! - Weights are finite, non-negative, and average exactly 1.
//! - At least one unit in each of the four group×period cells.
use crate::{
    did::{
        att::Cell,
        errors::{DidError, DidResult},
    },
    propensity::{LogitData, PropensityResult},
};
use ndarray::{Array1, Array2};

/// Validated repeated cross-section sample.
#[derive(Debug, Clone, PartialEq)]
pub struct RcData {
    y: Array1<f64>,
    post: Array1<f64>,
    d: Array1<f64>,
    covariates: Array2<f64>,
    weights: Array1<f64>,
}

impl RcData {
    /// Validate and normalize raw inputs.
    ///
    /// Parameters
    /// ----------
    /// - `y`: outcomes from both periods.
    /// - `post`: 1 for post-treatment observations, 0 otherwise.
    /// - `d`: 1 for the treated group, 0 otherwise.
    /// - `covariates`: `n × k` propensity covariates, intercept included by
    ///   the caller; `None` yields the intercept-only (unconditional) design.
    /// - `weights`: observation weights; `None` yields uniform weights.
    ///
    /// Errors
    /// ------
    /// - `EmptyData`, `LengthMismatch`, `NoCovariateColumns`,
    ///   `NonFiniteValue`, `NonBinaryIndicator` for malformed arrays.
    /// - `NegativeWeight`, `ZeroWeightSum` for unusable weights.
    /// - `NoTreatedUnits`, `NoControlUnits`, `NoPostPeriod`, `NoPrePeriod`
    ///   when a group or period is absent.
    /// - `EmptyCell` when a group-period combination has no units, checked
    ///   in [`Cell::ALL`] order.
    pub fn new(
        y: Array1<f64>, post: Array1<f64>, d: Array1<f64>, covariates: Option<Array2<f64>>,
        weights: Option<Array1<f64>>,
    ) -> DidResult<Self> {
        let n = d.len();
        if n == 0 {
            return Err(DidError::EmptyData);
        }
        check_len("y", y.len(), n)?;
        check_len("post", post.len(), n)?;

        let covariates = covariates.unwrap_or_else(|| Array2::ones((n, 1)));
        check_len("covariates", covariates.nrows(), n)?;
        if covariates.ncols() == 0 {
            return Err(DidError::NoCovariateColumns);
        }
        let weights = weights.unwrap_or_else(|| Array1::ones(n));
        check_len("i_weights", weights.len(), n)?;

        check_finite("y", y.iter())?;
        check_finite("covariates", covariates.iter())?;
        check_finite("i_weights", weights.iter())?;
        check_binary("post", &post)?;
        check_binary("d", &d)?;

        if let Some(index) = weights.iter().position(|&w| w < 0.0) {
            return Err(DidError::NegativeWeight { index, value: weights[index] });
        }
        let total = weights.sum();
        if total <= 0.0 {
            return Err(DidError::ZeroWeightSum);
        }
        let weights = weights * (n as f64 / total);

        if !d.iter().any(|&v| v == 1.0) {
            return Err(DidError::NoTreatedUnits);
        }
        if !d.iter().any(|&v| v == 0.0) {
            return Err(DidError::NoControlUnits);
        }
        if !post.iter().any(|&v| v == 1.0) {
            return Err(DidError::NoPostPeriod);
        }
        if !post.iter().any(|&v| v == 0.0) {
            return Err(DidError::NoPrePeriod);
        }
        for cell in Cell::ALL {
            if !d.iter().zip(post.iter()).any(|(&di, &pi)| cell.contains(di, pi)) {
                return Err(DidError::EmptyCell { cell });
            }
        }

        Ok(Self { y, post, d, covariates, weights })
    }

    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    pub fn post(&self) -> &Array1<f64> {
        &self.post
    }

    pub fn d(&self) -> &Array1<f64> {
        &self.d
    }

    pub fn covariates(&self) -> &Array2<f64> {
        &self.covariates
    }

    /// Observation weights, normalized to mean 1.
    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn n(&self) -> usize {
        self.d.len()
    }

    pub fn k(&self) -> usize {
        self.covariates.ncols()
    }

    /// Propensity-model inputs `(X, d, w)`.
    pub fn logit_data(&self) -> PropensityResult<LogitData> {
        LogitData::new(self.covariates.clone(), self.d.clone(), self.weights.clone())
    }

    /// Copy of the sample with weights multiplied elementwise by
    /// `multipliers` and renormalized to mean 1. Used by the weighted
    /// bootstrap; the multipliers are positive by construction.
    pub(crate) fn reweighted(&self, multipliers: &Array1<f64>) -> Self {
        let w = &self.weights * multipliers;
        let scale = self.n() as f64 / w.sum();
        Self {
            y: self.y.clone(),
            post: self.post.clone(),
            d: self.d.clone(),
            covariates: self.covariates.clone(),
            weights: w * scale,
        }
    }
}

// ---- Helper methods ----

fn check_len(name: &'static str, actual: usize, expected: usize) -> DidResult<()> {
    if actual != expected {
        return Err(DidError::LengthMismatch { name, expected, actual });
    }
    Ok(())
}

fn check_finite<'a>(name: &'static str, values: impl Iterator<Item = &'a f64>) -> DidResult<()> {
    for (index, &value) in values.enumerate() {
        if !value.is_finite() {
            return Err(DidError::NonFiniteValue { name, index, value });
        }
    }
    Ok(())
}

fn check_binary(name: &'static str, values: &Array1<f64>) -> DidResult<()> {
    match values.iter().position(|&v| v != 0.0 && v != 1.0) {
        Some(index) => Err(DidError::NonBinaryIndicator { name, index, value: values[index] }),
        None => Ok(()),
    }
}
