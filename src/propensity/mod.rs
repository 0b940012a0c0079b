//! propensity — weighted logistic propensity-score model.
//!
//! Purpose
//! -------
//! Estimate `P(d = 1 | x)` by weighted maximum likelihood and expose what
//! the IPW estimator needs downstream: clipped fitted probabilities, the
//! scaled inverse information matrix, and the asymptotic linear
//! representation of the coefficient estimate.
//!
//! Key behaviors
//! -------------
//! - [`LogitData`] bundles `(X, d, w)`; [`WeightedLogit`] implements the
//!   optimizer's `LogLikelihood` for it.
//! - [`LogitSolver`] is the pluggable fitting capability. The crate ships
//!   [`NewtonRaphson`] (default) and [`LbfgsLogit`], selectable through
//!   [`PropensitySolver`].
//! - [`PropensityModel`] runs the design rank check, the solver, the clip,
//!   and the information-matrix inverse with pseudo-inverse fallback.
//!
//! Invariants & assumptions
//! ------------------------
//! - Fitted probabilities are clipped to `[1e-6, 1 − 1e-6]` before any use.
//! - Non-convergence and the pseudo-inverse fallback are recorded on the
//!   model for the caller to report; they are never errors here.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the likelihood/gradient pair, both solvers, the
//!   closed-form intercept-only linearization, and singular designs.

pub mod errors;
pub mod information;
pub mod logit;
pub mod model;
pub mod solvers;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{PropensityError, PropensityResult};
pub use self::logit::{LogitData, WeightedLogit};
pub use self::model::{PropensityModel, fit_pscore};
pub use self::solvers::{
    LbfgsLogit, LogitFit, LogitSolver, NewtonOptions, NewtonRaphson, PropensitySolver,
};
