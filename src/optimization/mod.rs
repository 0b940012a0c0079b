//! optimization — likelihood optimizer, numerical helpers, and error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer behind the propensity-score logit: an
//! Argmin-backed log-likelihood maximizer, numerically stable transforms
//! for the logistic link, and a single error/result surface. Model code
//! implements a log-likelihood, chooses tolerances, and obtains fitted
//! parameters and diagnostics without touching backend solver details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **maximizing log-likelihoods** `ℓ(θ)`
//!   (`loglik_optimizer`), including configuration of solvers and stopping
//!   criteria.
//! - Supply shared numerical primitives (`numerical_stability`): guarded
//!   logistic/softplus, the propensity clip bound, and the eigenvalue
//!   cutoff used by pseudo-inverses.
//! - Normalize configuration issues, numerical failures, and backend solver
//!   errors into a single enum (`errors::OptError`) with a common result
//!   alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Optimizers operate in an unconstrained parameter space `θ` and assume
//!   finite inputs once validation has passed; invalid states are reported
//!   as `OptError`, not panics.
//!
//! Conventions
//! -----------
//! - All solvers conceptually maximize `ℓ(θ)` by minimizing an internal
//!   cost `c(θ) = -ℓ(θ)`; user-facing outcomes are expressed in terms of `ℓ`.
//! - Parameters and gradients use the `ndarray` aliases `Theta` and `Grad`.
//! - This layer does not log on its own; verbose runs attach argmin's slog
//!   observer behind the `obs_slog` feature.
//!
//! Downstream usage
//! ----------------
//! - `propensity::logit` implements `LogLikelihood` for the weighted logit
//!   and calls `maximize` when the L-BFGS propensity solver is selected.
//! - `propensity` uses `numerical_stability` for fitted probabilities and
//!   the information-matrix inverse.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_did::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
