//! numerical_stability — guarded scalar transforms and shared tolerances.
//!
//! Purpose
//! -------
//! Collect the numerically stable scalar transforms and small tolerances
//! used by the propensity-score logit and the linear-algebra helpers that
//! invert its information matrix. Centralizing them keeps every layer on
//! the same clip bounds and eigenvalue cutoffs.
//!
//! Key behaviors
//! -------------
//! - Provide `safe_logistic` (overflow-free inverse logit) and
//!   `safe_softplus` (overflow-free `ln(1 + eˣ)`) for the logit
//!   log-likelihood and fitted probabilities.
//! - Provide `clip_probability`, which clamps fitted propensity scores to
//!   `[PSCORE_CLIP, 1 − PSCORE_CLIP]` before any odds are formed.
//! - Centralize `EIGEN_EPS`, the relative eigenvalue cutoff used to detect
//!   singular information matrices and to truncate pseudo-inverses, and
//!   `INFO_RCOND`, the conditioning threshold for the pseudo-inverse path.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite `f64` values; shape and domain validation happens
//!   upstream in the data layer.
//! - `PSCORE_CLIP` is fixed at `1e-6`. Changing it changes estimates for
//!   units whose fitted scores sit at the boundary.
//!
//! Conventions
//! -----------
//! - Pure functions only: no logging, no I/O, no global state.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] compare the guarded transforms with
//!   naive formulas on safe grids and check their tails.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    EIGEN_EPS, INFO_RCOND, PSCORE_CLIP, clip_probability, safe_logistic, safe_softplus,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_did::optimization::numerical_stability::prelude::*;
//
// to import the main numerical-stability surface in a single line.

pub mod prelude {
    pub use super::transformations::{
        EIGEN_EPS, INFO_RCOND, PSCORE_CLIP, clip_probability, safe_logistic, safe_softplus,
    };
}
