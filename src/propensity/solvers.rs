//! propensity::solvers — pluggable weighted-logit solvers.
//!
//! Purpose
//! -------
//! Define the [`LogitSolver`] capability used by the propensity model and
//! ship two implementations: a Newton–Raphson (IRLS) solver on the
//! information matrix, and an L-BFGS solver built on the crate's
//! log-likelihood optimizer.
//!
//! Key behaviors
//! -------------
//! - [`NewtonRaphson`] starts at `β = 0`, takes full Newton steps
//!   `s = (X' diag(w p(1−p)) X)⁻¹ X'(w ∘ (d − p))`, and stops when
//!   `max |s| < tol` or after `max_iter` iterations.
//! - [`LbfgsLogit`] maximizes the average weighted log-likelihood via
//!   [`maximize`] from `β = 0`.
//! - [`PropensitySolver`] is the configuration-level choice between the two
//!   and itself implements [`LogitSolver`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Solvers do not clip fitted probabilities and do not check the design
//!   rank; the propensity model does both.
//! - Hitting the iteration cap is reported through `converged == false`,
//!   never as an error. Non-finite coefficients are always an error.
use crate::{
    optimization::loglik_optimizer::{MLEOptions, maximize},
    propensity::{
        errors::{PropensityError, PropensityResult},
        information::{solve_symmetric, weighted_gram},
        logit::{LogitData, WeightedLogit, fitted_probabilities},
    },
};
use ndarray::Array1;

/// Raw output of a logit solver.
#[derive(Debug, Clone, PartialEq)]
pub struct LogitFit {
    pub coefficients: Array1<f64>,
    pub converged: bool,
    pub iterations: usize,
}

/// Capability: fit a weighted logit of `d` on `X`.
///
/// Implementations must be shareable across bootstrap worker threads.
pub trait LogitSolver: Send + Sync {
    /// # Errors
    /// - [`PropensityError::NonFiniteCoefficients`] if the iterate leaves
    ///   the finite domain.
    /// - Solver-specific failures wrapped as [`PropensityError`].
    fn fit(&self, data: &LogitData) -> PropensityResult<LogitFit>;
}

/// Newton–Raphson stopping rules.
///
/// Defaults: `max_iter = 35`, `tol = 1e-8` on the largest absolute step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonOptions {
    pub max_iter: usize,
    pub tol: f64,
}

impl Default for NewtonOptions {
    fn default() -> Self {
        Self { max_iter: 35, tol: 1e-8 }
    }
}

/// Newton–Raphson / IRLS weighted-logit solver.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NewtonRaphson {
    pub opts: NewtonOptions,
}

impl NewtonRaphson {
    pub fn new(opts: NewtonOptions) -> Self {
        Self { opts }
    }
}

impl LogitSolver for NewtonRaphson {
    fn fit(&self, data: &LogitData) -> PropensityResult<LogitFit> {
        let mut beta = Array1::<f64>::zeros(data.k());
        let mut converged = false;
        let mut iterations = 0;

        while iterations < self.opts.max_iter {
            iterations += 1;
            let p = fitted_probabilities(data.x(), &beta);
            let score = data.x().t().dot(&(data.w() * &(data.d() - &p)));
            let curvature = data.w() * &p.mapv(|pi| pi * (1.0 - pi));
            let info = weighted_gram(data.x(), &curvature);
            let step = solve_symmetric(&info, &score);
            beta += &step;
            check_finite(&beta)?;

            let max_step = step.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()));
            if max_step < self.opts.tol {
                converged = true;
                break;
            }
        }
        tracing::debug!(iterations, converged, "newton-raphson logit finished");
        Ok(LogitFit { coefficients: beta, converged, iterations })
    }
}

/// L-BFGS weighted-logit solver on the average log-likelihood.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LbfgsLogit {
    pub opts: MLEOptions,
}

impl LbfgsLogit {
    pub fn new(opts: MLEOptions) -> Self {
        Self { opts }
    }
}

impl LogitSolver for LbfgsLogit {
    fn fit(&self, data: &LogitData) -> PropensityResult<LogitFit> {
        let theta0 = Array1::<f64>::zeros(data.k());
        let outcome = maximize(&WeightedLogit, theta0, data, &self.opts)?;
        tracing::debug!(
            iterations = outcome.iterations,
            status = %outcome.status,
            "l-bfgs logit finished"
        );
        Ok(LogitFit {
            coefficients: outcome.theta_hat,
            converged: outcome.converged,
            iterations: outcome.iterations,
        })
    }
}

/// Configuration-level choice of propensity solver.
#[derive(Debug, Clone, PartialEq)]
pub enum PropensitySolver {
    Newton(NewtonOptions),
    Lbfgs(MLEOptions),
}

impl Default for PropensitySolver {
    fn default() -> Self {
        PropensitySolver::Newton(NewtonOptions::default())
    }
}

impl LogitSolver for PropensitySolver {
    fn fit(&self, data: &LogitData) -> PropensityResult<LogitFit> {
        match self {
            PropensitySolver::Newton(opts) => NewtonRaphson::new(*opts).fit(data),
            PropensitySolver::Lbfgs(opts) => LbfgsLogit::new(opts.clone()).fit(data),
        }
    }
}

fn check_finite(beta: &Array1<f64>) -> PropensityResult<()> {
    match beta.iter().position(|b| !b.is_finite()) {
        Some(index) => Err(PropensityError::NonFiniteCoefficients { index, value: beta[index] }),
        None => Ok(()),
    }
}
