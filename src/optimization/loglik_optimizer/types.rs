//! loglik_optimizer::types — numeric aliases and L-BFGS wiring.
//!
//! Purpose
//! -------
//! Keep the parameter/gradient/cost shapes and the concrete Argmin solver
//! types in one place so the builders, runner, and adapter agree on them.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` are `Array1<f64>` of length equal to the number of
//!   logit coefficients (intercept included).
//! - `Cost` is the scalar handed to Argmin, i.e. the *negated*
//!   log-likelihood.
//! - The line-search aliases follow Argmin's `(Param, Gradient, Float)`
//!   parameter order.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Gradient vector, same shape as [`Theta`].
pub type Grad = Array1<f64>;

/// Scalar objective value.
pub type Cost = f64;

/// Function-evaluation counters reported by Argmin (e.g. `"cost_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// Default L-BFGS history size.
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
