//! Standardized (Hajek) IPW DiD estimator for repeated cross-sections.
//!
//! Purpose
//! -------
//! Estimate the ATT in a 2×2 DiD design with repeated cross-section data by
//! inverse propensity weighting, with the IPW weights normalized within each
//! group-period cell, and quantify its uncertainty analytically or by
//! bootstrap.
//!
//! Key behaviors
//! -------------
//! - [`std_ipw_did_rc`] is the default entry point: Newton (or configured)
//!   logit, Mammen multiplier bootstrap, and exponential-weights bootstrap,
//!   all seeded from `opts.seed`.
//! - [`std_ipw_did_rc_with`] runs the same pipeline with caller-supplied
//!   [`Collaborators`].
//! - [`std_ipw_att`] is the point-estimate-only path (no influence
//!   function, no warnings), shared with the weighted bootstrap.
//!
//! Invariants & assumptions
//! ------------------------
//! - Pipeline order: propensity fit → clip → trim/weights → Hajek means →
//!   ATT → influence function → variance. No stage mutates an earlier
//!   stage's output.
//! - Non-convergence and the pseudo-inverse fallback are returned as
//!   warnings; every other failure aborts with a
//!   [`DidError`](crate::did::DidError).
//!
//! Downstream usage
//! ----------------
//! - Rust callers construct [`RcData`] and [`IpwDidOptions`] and call
//!   [`std_ipw_did_rc`]; the Python binding wraps the same call.
//!
//! Testing notes
//! -------------
//! - Unit tests here check the metadata echo and warning plumbing; the
//!   statistical properties live in `tests/integration_std_ipw_pipeline.rs`.
use crate::{
    did::{
        att::CellMeans,
        data::RcData,
        diagnostics::{Diagnostics, EstimationWarning},
        errors::DidResult,
        influence::influence_function,
        options::{BootType, IpwDidOptions},
        weights::WeightSet,
    },
    inference::{
        bootstrap::{ExponentialWeights, MammenMultiplier, MultiplierBootstrap, WeightedBootstrap},
        variance::estimate_variance,
    },
    propensity::{LogitSolver, PropensityModel, fit_pscore},
};
use ndarray::Array1;

/// Pluggable collaborators of the estimator.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub propensity: &'a dyn LogitSolver,
    pub multiplier: &'a dyn MultiplierBootstrap,
    pub weighted: &'a dyn WeightedBootstrap,
}

/// Configuration echo attached to every outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct IpwDidArgs {
    pub panel: bool,
    pub normalized: bool,
    pub boot: bool,
    pub boot_type: BootType,
    pub nboot: usize,
    pub estimator: &'static str,
    pub trim_level: f64,
}

impl IpwDidArgs {
    fn from_options(opts: &IpwDidOptions) -> Self {
        Self {
            panel: false,
            normalized: true,
            boot: opts.boot,
            boot_type: opts.boot_type,
            nboot: opts.nboot,
            estimator: "ipw",
            trim_level: opts.trim_level,
        }
    }
}

/// Result of the standardized IPW DiD estimator.
///
/// - `boots`: bootstrap replicates when `boot` is set (ATT replicates for
///   the weighted bootstrap, centered draws for the multiplier bootstrap).
/// - `att_inf_func`: per-unit influence function when requested.
/// - `warnings`: non-fatal conditions raised during estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct IpwDidOutcome {
    pub att: f64,
    pub se: f64,
    pub uci: f64,
    pub lci: f64,
    pub boots: Option<Array1<f64>>,
    pub att_inf_func: Option<Array1<f64>>,
    pub args: IpwDidArgs,
    pub warnings: Vec<EstimationWarning>,
}

/// Estimate the ATT with the default collaborators.
///
/// Errors
/// ------
/// - Option validation errors (`DidError::InvalidTrimLevel`,
///   `DidError::InvalidReplicates`).
/// - Estimation errors from the propensity model.
/// - `DidError::DegenerateWeights` when a cell has no weight after
///   trimming.
/// - `DidError::Cancelled` / `DidError::NoValidReplicates` from the
///   bootstrap.
///
/// Examples
/// --------
/// ```
/// use ndarray::array;
/// use rust_did::did::{IpwDidOptions, RcData, std_ipw_did_rc};
///
/// let data = RcData::new(
///     array![1.0, 3.5, 0.8, 1.9, 1.2, 3.1, 1.1, 2.2],
///     array![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
///     array![1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0],
///     None,
///     None,
/// )?;
/// let out = std_ipw_did_rc(&data, &IpwDidOptions::default())?;
/// assert!(out.lci <= out.att && out.att <= out.uci);
/// # Ok::<(), rust_did::did::DidError>(())
/// ```
pub fn std_ipw_did_rc(data: &RcData, opts: &IpwDidOptions) -> DidResult<IpwDidOutcome> {
    opts.validate()?;
    let seed = opts.seed.unwrap_or_else(rand::random);
    if opts.boot {
        tracing::debug!(seed, boot_type = %opts.boot_type, nboot = opts.nboot, "bootstrap seed");
    }
    let multiplier = MammenMultiplier::new(seed, opts.cancel.clone());
    let weighted = ExponentialWeights::new(seed, opts.cancel.clone(), &opts.solver);
    let collab =
        Collaborators { propensity: &opts.solver, multiplier: &multiplier, weighted: &weighted };
    std_ipw_did_rc_with(data, opts, &collab)
}

/// Estimate the ATT with caller-supplied collaborators.
///
/// Errors
/// ------
/// - As [`std_ipw_did_rc`], plus any error the collaborators return.
pub fn std_ipw_did_rc_with(
    data: &RcData, opts: &IpwDidOptions, collab: &Collaborators<'_>,
) -> DidResult<IpwDidOutcome> {
    opts.validate()?;
    let mut diagnostics = Diagnostics::new();

    let logit = data.logit_data()?;
    let ps_model = PropensityModel::fit(&logit, collab.propensity)?;
    if !ps_model.converged() {
        diagnostics.push(EstimationWarning::NonConvergence { iterations: ps_model.iterations() });
    }
    if let Some(min_eigenvalue) = ps_model.pseudo_inverse_min_eigenvalue() {
        diagnostics.push(EstimationWarning::SingularHessian { min_eigenvalue });
    }

    let weights = WeightSet::build(data, ps_model.pscore(), opts.trim_level);
    let means = CellMeans::compute(&weights, data.y())?;
    let att = means.att();

    let asy_lin_rep = ps_model.asy_lin_rep(&logit);
    let inf_func = influence_function(data, &weights, &means, &asy_lin_rep);

    let (interval, boots) = estimate_variance(att, &inf_func, data, opts, collab)?;

    Ok(IpwDidOutcome {
        att,
        se: interval.se,
        uci: interval.uci,
        lci: interval.lci,
        boots,
        att_inf_func: opts.influence_func.then_some(inf_func),
        args: IpwDidArgs::from_options(opts),
        warnings: diagnostics.into_warnings(),
    })
}

/// Point estimate only: fit, clip, trim, and combine Hajek means.
///
/// Errors
/// ------
/// - Estimation errors from the propensity fit.
/// - `DidError::DegenerateWeights` for an empty cell after trimming.
pub fn std_ipw_att(data: &RcData, trim_level: f64, solver: &dyn LogitSolver) -> DidResult<f64> {
    let logit = data.logit_data()?;
    let (pscore, converged) = fit_pscore(&logit, solver)?;
    if !converged {
        tracing::debug!("propensity score did not converge in point-estimate path");
    }
    let weights = WeightSet::build(data, &pscore, trim_level);
    Ok(CellMeans::compute(&weights, data.y())?.att())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::did::errors::DidError;
    use crate::propensity::{LogitData, LogitFit, NewtonOptions, PropensityResult, PropensitySolver};
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The metadata echo and optional outputs.
    // - Warning plumbing for a solver that stops on its iteration cap.
    // - Use of caller-supplied collaborators.
    // -------------------------------------------------------------------------

    fn small_sample() -> RcData {
        RcData::new(
            array![1.0, 3.5, 0.8, 1.9, 1.2, 3.1, 1.1, 2.2, 0.9, 2.0],
            array![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0],
            array![1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0],
            Some(ndarray::Array2::from_shape_fn((10, 2), |(i, j)| {
                if j == 0 { 1.0 } else { (i % 4) as f64 * 0.5 }
            })),
            None,
        )
        .expect("valid data")
    }

    struct ZeroMultiplier;

    impl MultiplierBootstrap for ZeroMultiplier {
        fn replicates(&self, _: &Array1<f64>, nboot: usize) -> DidResult<Array1<f64>> {
            Ok(Array1::from_shape_fn(nboot, |b| if b % 2 == 0 { 0.1 } else { -0.1 }))
        }
    }

    struct UnusedWeighted;

    impl WeightedBootstrap for UnusedWeighted {
        fn replicates(&self, _: &RcData, _: usize, _: f64) -> DidResult<Array1<f64>> {
            Err(DidError::Estimation { reason: "not used".to_string() })
        }
    }

    struct ZeroCoefficients;

    impl LogitSolver for ZeroCoefficients {
        fn fit(&self, data: &LogitData) -> PropensityResult<LogitFit> {
            Ok(LogitFit { coefficients: Array1::zeros(data.k()), converged: true, iterations: 0 })
        }
    }

    #[test]
    // Purpose
    // -------
    // The outcome echoes the configuration and honors `influence_func`.
    //
    // Given
    // -----
    // - Default options with `influence_func = true`.
    //
    // Expect
    // ------
    // - args = {panel: false, normalized: true, boot: false,
    //   boot_type: weighted, nboot: 999, type: "ipw", trim_level: 0.995};
    //   IF of length n; no replicates.
    fn outcome_echoes_configuration() {
        let opts = IpwDidOptions { influence_func: true, ..IpwDidOptions::default() };
        let out = std_ipw_did_rc(&small_sample(), &opts).expect("estimate");
        assert_eq!(
            out.args,
            IpwDidArgs {
                panel: false,
                normalized: true,
                boot: false,
                boot_type: BootType::Weighted,
                nboot: 999,
                estimator: "ipw",
                trim_level: 0.995,
            }
        );
        assert_eq!(out.att_inf_func.as_ref().map(|v| v.len()), Some(10));
        assert!(out.boots.is_none());
        assert!(out.se >= 0.0);
    }

    #[test]
    // Purpose
    // -------
    // A solver stopped by its iteration cap yields a warning, not an error.
    //
    // Given
    // -----
    // - Newton with `max_iter = 1`.
    //
    // Expect
    // ------
    // - `Ok` with a single `NonConvergence { iterations: 1 }` warning.
    fn non_convergence_is_reported_as_warning() {
        let opts = IpwDidOptions::default()
            .with_solver(PropensitySolver::Newton(NewtonOptions { max_iter: 1, tol: 1e-8 }));
        let out = std_ipw_did_rc(&small_sample(), &opts).expect("estimate");
        assert_eq!(out.warnings, vec![EstimationWarning::NonConvergence { iterations: 1 }]);
    }

    #[test]
    // Purpose
    // -------
    // Caller-supplied collaborators replace the defaults end to end.
    //
    // Given
    // -----
    // - A logit solver returning β = 0 (ps = 0.5 everywhere) and a
    //   multiplier engine returning ±0.1.
    //
    // Expect
    // ------
    // - ATT equals the unweighted DiD of means; the replicates are the
    //   engine's; the point-estimate path agrees with the full path.
    fn custom_collaborators_are_used() {
        // Arrange
        let data = small_sample();
        let opts = IpwDidOptions {
            boot: true,
            boot_type: BootType::Multiplier,
            nboot: 4,
            ..IpwDidOptions::default()
        };
        let collab = Collaborators {
            propensity: &ZeroCoefficients,
            multiplier: &ZeroMultiplier,
            weighted: &UnusedWeighted,
        };

        // Act
        let out = std_ipw_did_rc_with(&data, &opts, &collab).expect("estimate");
        let point = std_ipw_att(&data, 0.995, &ZeroCoefficients).expect("point estimate");

        // Assert
        let tp = (3.5 + 3.1) / 2.0;
        let tpre = (1.0 + 1.2) / 2.0;
        let cp = (1.9 + 2.2 + 2.0) / 3.0;
        let cpre = (0.8 + 1.1 + 0.9) / 3.0;
        approx::assert_abs_diff_eq!(out.att, (tp - tpre) - (cp - cpre), epsilon = 1e-12);
        approx::assert_abs_diff_eq!(point, out.att, epsilon = 1e-12);
        assert_eq!(out.boots, Some(array![0.1, -0.1, 0.1, -0.1]));
    }
}
