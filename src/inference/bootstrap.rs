//! inference::bootstrap — bootstrap engines and cancellation.
//!
//! Purpose
//! -------
//! Define the two pluggable bootstrap capabilities used by the variance
//! dispatch and ship a seeded, parallel default for each.
//!
//! Key behaviors
//! -------------
//! - [`MultiplierBootstrap`]: `(IF, B) → B` replicates. Default
//!   [`MammenMultiplier`] draws Mammen two-point multipliers `v` and
//!   returns `mean(v ∘ IF)` per replicate.
//! - [`WeightedBootstrap`]: `(data, B, τ) → B` replicates of the ATT.
//!   Default [`ExponentialWeights`] multiplies observation weights by
//!   i.i.d. `Exp(1)` draws, refits the propensity score, and recomputes
//!   the trimmed Hajek ATT. A replicate that fails to estimate yields NaN.
//! - Replicates run on the rayon pool. Replicate `b` owns the ChaCha
//!   stream `b` of the shared seed, so output does not depend on thread
//!   scheduling, and results come back in replicate order.
//! - [`CancelFlag`] aborts a running bootstrap with `DidError::Cancelled`;
//!   no partial replicates are returned.
use crate::{
    did::{
        data::RcData,
        errors::{DidError, DidResult},
        std_ipw::std_ipw_att,
    },
    propensity::LogitSolver,
};
use ndarray::Array1;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Exp1;
use rayon::prelude::*;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// Shared flag a caller sets to abort a running bootstrap.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Capability: multiplier bootstrap on a fixed influence function.
pub trait MultiplierBootstrap: Send + Sync {
    /// # Errors
    /// - [`DidError::Cancelled`] if aborted.
    fn replicates(&self, inf_func: &Array1<f64>, nboot: usize) -> DidResult<Array1<f64>>;
}

/// Capability: weighted (resampling) bootstrap that re-runs the estimator.
pub trait WeightedBootstrap: Send + Sync {
    /// Returns ATT replicates (not deviations); non-finite entries mark
    /// replicates that could not be estimated.
    ///
    /// # Errors
    /// - [`DidError::Cancelled`] if aborted.
    fn replicates(&self, data: &RcData, nboot: usize, trim_level: f64) -> DidResult<Array1<f64>>;
}

/// Mammen two-point multiplier bootstrap.
///
/// `v = (1 − √5)/2` with probability `(√5 + 1)/(2√5)`, else `(1 + √5)/2`,
/// so that `E[v] = 0` and `E[v²] = 1`.
#[derive(Debug, Clone)]
pub struct MammenMultiplier {
    seed: u64,
    cancel: Option<CancelFlag>,
}

impl MammenMultiplier {
    pub fn new(seed: u64, cancel: Option<CancelFlag>) -> Self {
        Self { seed, cancel }
    }
}

impl MultiplierBootstrap for MammenMultiplier {
    fn replicates(&self, inf_func: &Array1<f64>, nboot: usize) -> DidResult<Array1<f64>> {
        let sqrt5 = 5.0_f64.sqrt();
        let low = (1.0 - sqrt5) / 2.0;
        let high = (1.0 + sqrt5) / 2.0;
        let p_low = (sqrt5 + 1.0) / (2.0 * sqrt5);
        let n = inf_func.len() as f64;

        let draws = (0..nboot)
            .into_par_iter()
            .map(|b| {
                check_cancelled(self.cancel.as_ref())?;
                let mut rng = replicate_rng(self.seed, b);
                let total: f64 = inf_func
                    .iter()
                    .map(|&psi| if rng.gen_bool(p_low) { low * psi } else { high * psi })
                    .sum();
                Ok(total / n)
            })
            .collect::<DidResult<Vec<f64>>>()?;
        check_cancelled(self.cancel.as_ref())?;
        tracing::debug!(nboot, seed = self.seed, "multiplier bootstrap finished");
        Ok(Array1::from(draws))
    }
}

/// Exponential-weights bootstrap that refits the propensity score per
/// replicate with `solver`.
#[derive(Clone)]
pub struct ExponentialWeights<'a> {
    seed: u64,
    cancel: Option<CancelFlag>,
    solver: &'a dyn LogitSolver,
}

impl<'a> ExponentialWeights<'a> {
    pub fn new(seed: u64, cancel: Option<CancelFlag>, solver: &'a dyn LogitSolver) -> Self {
        Self { seed, cancel, solver }
    }
}

impl WeightedBootstrap for ExponentialWeights<'_> {
    fn replicates(&self, data: &RcData, nboot: usize, trim_level: f64) -> DidResult<Array1<f64>> {
        let n = data.n();
        let draws = (0..nboot)
            .into_par_iter()
            .map(|b| {
                check_cancelled(self.cancel.as_ref())?;
                let mut rng = replicate_rng(self.seed, b);
                let v = Array1::from_iter((0..n).map(|_| rng.sample::<f64, _>(Exp1)));
                match std_ipw_att(&data.reweighted(&v), trim_level, self.solver) {
                    Ok(att) => Ok(att),
                    Err(DidError::Cancelled) => Err(DidError::Cancelled),
                    Err(err) => {
                        tracing::debug!(replicate = b, %err, "weighted bootstrap replicate failed");
                        Ok(f64::NAN)
                    }
                }
            })
            .collect::<DidResult<Vec<f64>>>()?;
        check_cancelled(self.cancel.as_ref())?;
        tracing::debug!(nboot, seed = self.seed, "weighted bootstrap finished");
        Ok(Array1::from(draws))
    }
}

// ---- Helper methods ----

fn replicate_rng(seed: u64, replicate: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(replicate as u64);
    rng
}

fn check_cancelled(cancel: Option<&CancelFlag>) -> DidResult<()> {
    match cancel {
        Some(flag) if flag.is_cancelled() => Err(DidError::Cancelled),
        _ => Ok(()),
    }
}
