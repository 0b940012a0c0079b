//! inference — standard errors and confidence intervals for the ATT.
//!
//! Purpose
//! -------
//! Quantify the sampling uncertainty of the IPW DiD point estimate, either
//! analytically from its influence function or by bootstrap.
//!
//! Key behaviors
//! -------------
//! - [`variance`] computes the analytic interval and the IQR-based robust
//!   bootstrap interval, and dispatches on the estimator options.
//! - [`bootstrap`] defines the [`MultiplierBootstrap`] and
//!   [`WeightedBootstrap`] capabilities, their seeded parallel defaults,
//!   and the [`CancelFlag`] that aborts them.
//!
//! Invariants & assumptions
//! ------------------------
//! - Influence functions are per-unit with mean approximately zero; the
//!   analytic SE is `sd(IF) / √n`.
//! - Bootstrap engines are deterministic given a seed regardless of thread
//!   count.

pub mod bootstrap;
pub mod variance;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::bootstrap::{
    CancelFlag, ExponentialWeights, MammenMultiplier, MultiplierBootstrap, WeightedBootstrap,
};
pub use self::variance::{
    Interval, Z_95, analytic_interval, bootstrap_interval, estimate_variance, quantile_sorted,
};
