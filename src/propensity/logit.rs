//! Weighted logistic log-likelihood for the propensity score.
//!
//! Purpose
//! -------
//! Hold the `(X, d, w)` triple for a weighted logit and expose its average
//! log-likelihood and gradient through the optimizer's [`LogLikelihood`]
//! trait, so the L-BFGS layer can fit it directly.
//!
//! Conventions
//! -----------
//! - `ℓ(β) = (1/n) Σᵢ wᵢ [dᵢ ηᵢ − softplus(ηᵢ)]` with `ηᵢ = xᵢ'β`.
//! - `∇ℓ(β) = (1/n) X' (w ∘ (d − p))` with `p = σ(Xβ)`.
//! - Fitted probabilities returned by [`fitted_probabilities`] are *not*
//!   clipped; clipping is applied once by the propensity model.
use crate::{
    optimization::{
        errors::{OptError, OptResult},
        loglik_optimizer::{Cost, Grad, LogLikelihood, Theta},
        numerical_stability::{safe_logistic, safe_softplus},
    },
    propensity::errors::{PropensityError, PropensityResult},
};
use ndarray::{Array1, Array2};

/// Data for a weighted logit: design `x` (n×k), binary response `d`, and
/// non-negative weights `w`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogitData {
    x: Array2<f64>,
    d: Array1<f64>,
    w: Array1<f64>,
}

impl LogitData {
    /// Bundle a design, response, and weights.
    ///
    /// # Errors
    /// - [`PropensityError::DimensionMismatch`] if `d` or `w` does not have
    ///   one entry per row of `x`.
    pub fn new(x: Array2<f64>, d: Array1<f64>, w: Array1<f64>) -> PropensityResult<Self> {
        let n = x.nrows();
        if d.len() != n {
            return Err(PropensityError::DimensionMismatch {
                expected: n,
                actual: d.len(),
                what: "response",
            });
        }
        if w.len() != n {
            return Err(PropensityError::DimensionMismatch {
                expected: n,
                actual: w.len(),
                what: "weights",
            });
        }
        Ok(Self { x, d, w })
    }

    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn d(&self) -> &Array1<f64> {
        &self.d
    }

    pub fn w(&self) -> &Array1<f64> {
        &self.w
    }

    pub fn n(&self) -> usize {
        self.x.nrows()
    }

    pub fn k(&self) -> usize {
        self.x.ncols()
    }
}

/// `σ(Xβ)` evaluated with the overflow-safe logistic.
pub fn fitted_probabilities(x: &Array2<f64>, beta: &Array1<f64>) -> Array1<f64> {
    x.dot(beta).mapv(safe_logistic)
}

/// Weighted logit log-likelihood on the average scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightedLogit;

impl LogLikelihood for WeightedLogit {
    type Data = LogitData;

    fn value(&self, theta: &Theta, data: &LogitData) -> OptResult<Cost> {
        let eta = data.x.dot(theta);
        let total: f64 = eta
            .iter()
            .zip(data.d.iter())
            .zip(data.w.iter())
            .map(|((&e, &d), &w)| w * (d * e - safe_softplus(e)))
            .sum();
        Ok(total / data.n() as f64)
    }

    fn grad(&self, theta: &Theta, data: &LogitData) -> OptResult<Grad> {
        let p = fitted_probabilities(&data.x, theta);
        let resid = &data.w * &(&data.d - &p);
        Ok(data.x.t().dot(&resid) / data.n() as f64)
    }

    fn check(&self, theta: &Theta, data: &LogitData) -> OptResult<()> {
        if theta.len() != data.k() {
            return Err(OptError::ThetaLengthMismatch { expected: data.k(), actual: theta.len() });
        }
        Ok(())
    }
}
