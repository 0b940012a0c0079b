//! propensity::model — fitted propensity score and its linearization.
//!
//! Purpose
//! -------
//! Turn a raw logit fit into everything the IPW estimator consumes: clipped
//! fitted probabilities, the scaled inverse information matrix, and the
//! per-unit asymptotic linear representation of the coefficient estimate.
//!
//! Key behaviors
//! -------------
//! - [`PropensityModel::fit`] checks the design rank, runs the solver,
//!   clips `σ(Xβ̂)` to `[1e-6, 1 − 1e-6]`, and inverts
//!   `X' diag(w · ps · (1 − ps)) X` (clipped `ps`), scaling the inverse by
//!   `n`. A singular information matrix falls back to the pseudo-inverse
//!   and is recorded on the model, not raised.
//! - [`fit_pscore`] is the point-estimate path: rank check, solve, clip,
//!   no information matrix. Bootstrap replicates use it.
//! - [`PropensityModel::asy_lin_rep`] returns `score · H` with
//!   `scoreᵢ = wᵢ (dᵢ − psᵢ) xᵢ`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `pscore` entries lie in `[PSCORE_CLIP, 1 − PSCORE_CLIP]`.
//! - `hessian` is `k × k`; `asy_lin_rep` is `n × k`.
use crate::{
    optimization::numerical_stability::clip_probability,
    propensity::{
        errors::{PropensityError, PropensityResult},
        information::{invert_information, numerical_rank, weighted_gram},
        logit::{LogitData, fitted_probabilities},
        solvers::LogitSolver,
    },
};
use ndarray::{Array1, Array2, Axis};

/// Fitted propensity-score model.
#[derive(Debug, Clone, PartialEq)]
pub struct PropensityModel {
    coefficients: Array1<f64>,
    pscore: Array1<f64>,
    hessian: Array2<f64>,
    converged: bool,
    iterations: usize,
    pseudo_inverse_min_eigenvalue: Option<f64>,
}

impl PropensityModel {
    /// Fit the propensity model and build its linearization inputs.
    ///
    /// Errors
    /// ------
    /// - [`PropensityError::SingularDesign`] when `X' diag(w) X` is rank
    ///   deficient.
    /// - Any solver error (non-finite coefficients, backend failure).
    pub fn fit(data: &LogitData, solver: &dyn LogitSolver) -> PropensityResult<Self> {
        let (coefficients, pscore, converged, iterations) = fit_clipped(data, solver)?;

        let ps_weights = data.w() * &pscore.mapv(|p| p * (1.0 - p));
        let info = weighted_gram(data.x(), &ps_weights);
        let inverse = invert_information(&info);
        let hessian = inverse.matrix * data.n() as f64;

        Ok(Self {
            coefficients,
            pscore,
            hessian,
            converged,
            iterations,
            pseudo_inverse_min_eigenvalue: if inverse.pseudo { inverse.min_eigenvalue } else { None },
        })
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    /// Clipped fitted probabilities.
    pub fn pscore(&self) -> &Array1<f64> {
        &self.pscore
    }

    /// `inverse(X' diag(w · ps · (1 − ps)) X) · n`.
    pub fn hessian(&self) -> &Array2<f64> {
        &self.hessian
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Smallest eigenvalue of the information matrix when the pseudo-inverse
    /// fallback was used; `None` when the exact inverse succeeded.
    pub fn pseudo_inverse_min_eigenvalue(&self) -> Option<f64> {
        self.pseudo_inverse_min_eigenvalue
    }

    /// Asymptotic linear representation of `β̂`: an `n × k` matrix whose row
    /// `i` is `wᵢ (dᵢ − psᵢ) xᵢ' H`.
    pub fn asy_lin_rep(&self, data: &LogitData) -> Array2<f64> {
        let resid = data.w() * &(data.d() - &self.pscore);
        let score = data.x() * &resid.insert_axis(Axis(1));
        score.dot(&self.hessian)
    }
}

/// Point-estimate path: clipped fitted probabilities only.
///
/// Returns the clipped propensity scores and the solver's convergence flag.
pub fn fit_pscore(
    data: &LogitData, solver: &dyn LogitSolver,
) -> PropensityResult<(Array1<f64>, bool)> {
    let (_, pscore, converged, _) = fit_clipped(data, solver)?;
    Ok((pscore, converged))
}

fn fit_clipped(
    data: &LogitData, solver: &dyn LogitSolver,
) -> PropensityResult<(Array1<f64>, Array1<f64>, bool, usize)> {
    let dim = data.k();
    let rank = numerical_rank(&weighted_gram(data.x(), data.w()));
    if rank < dim {
        return Err(PropensityError::SingularDesign { rank, dim });
    }

    let fit = solver.fit(data)?;
    if let Some(index) = fit.coefficients.iter().position(|b| !b.is_finite()) {
        return Err(PropensityError::NonFiniteCoefficients {
            index,
            value: fit.coefficients[index],
        });
    }
    let pscore = fitted_probabilities(data.x(), &fit.coefficients).mapv(clip_probability);
    Ok((fit.coefficients, pscore, fit.converged, fit.iterations))
}
