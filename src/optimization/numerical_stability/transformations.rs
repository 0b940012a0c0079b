//! Numerical stability utilities.
//!
//! Provides safe implementations of the logistic link and its companion
//! softplus, both prone to overflow/underflow in naïve form, plus the
//! clip bound applied to fitted propensity scores.
//!
//! # Provided items
//! - [`PSCORE_CLIP`]: lower clip bound for fitted probabilities (1e-6); the
//!   upper bound is `1 − PSCORE_CLIP`.
//! - [`EIGEN_EPS`]: relative cutoff below which an eigenvalue of a
//!   symmetric information matrix is treated as zero.
//! - [`INFO_RCOND`]: reciprocal condition number (after rescaling to unit
//!   diagonal) at or below which an information matrix counts as singular.
//! - [`safe_logistic(x)`]: `1 / (1 + exp(-x))` without overflow.
//! - [`safe_softplus(x)`]: `ln(1 + exp(x))` without overflow.
//! - [`clip_probability(p)`]: clamp into `[PSCORE_CLIP, 1 − PSCORE_CLIP]`.

/// Clip bound for fitted propensity scores.
///
/// Fitted probabilities are clamped to `[PSCORE_CLIP, 1 − PSCORE_CLIP]` so
/// that the control odds `p / (1 − p)` stay finite.
pub const PSCORE_CLIP: f64 = 1e-6;

/// Relative eigenvalue cutoff for symmetric information matrices.
///
/// An eigenvalue `λ` with `λ ≤ EIGEN_EPS · λ_max` is treated as zero.
pub const EIGEN_EPS: f64 = 1e-12;

/// Singularity threshold for information matrices.
///
/// A matrix whose unit-diagonal rescaling has `λ_min / λ_max ≤ INFO_RCOND`
/// is inverted through the pseudo-inverse even when Cholesky succeeds.
pub const INFO_RCOND: f64 = 1e-8;

/// Numerically stable logistic function `σ(x) = 1 / (1 + exp(-x))`.
///
/// Branches on the sign of `x` so that `exp` is only ever evaluated at a
/// non-positive argument.
///
/// # Parameters
/// - `x`: real input (linear index `xᵢ'β`).
///
/// # Returns
/// - `σ(x)` in `[0, 1]`.
pub fn safe_logistic(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Numerically stable softplus: `softplus(x) = ln(1 + exp(x))`.
///
/// - For sufficiently large `x`, `softplus(x) ≈ x`.
/// - Otherwise, it falls back to `ln1p(exp(x))`.
///
/// The cutoff (`x > 20.0`) keeps the calculation in a well-conditioned
/// regime for `f64`.
pub fn safe_softplus(x: f64) -> f64 {
    if x > 20.0 { x } else { x.exp().ln_1p() }
}

/// Clamp a fitted probability into `[PSCORE_CLIP, 1 − PSCORE_CLIP]`.
pub fn clip_probability(p: f64) -> f64 {
    p.clamp(PSCORE_CLIP, 1.0 - PSCORE_CLIP)
}
