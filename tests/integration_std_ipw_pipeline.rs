//! Integration tests for the standardized IPW DiD estimator.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: from validated repeated
//!   cross-section data, through the propensity fit, trimmed Hajek means,
//!   and influence function, to analytic and bootstrap inference.
//! - Exercise realistic synthetic designs where the propensity score
//!   depends on a covariate, rather than toy edge cases only.
//!
//! Coverage
//! --------
//! - `did`: `RcData`, `IpwDidOptions`, `std_ipw_did_rc`.
//! - `propensity`: Newton and L-BFGS solvers through `PropensitySolver`.
//! - `inference`: analytic SE, multiplier and weighted bootstrap, and
//!   cancellation.
//! - Poorly scaled and nearly collinear propensity designs.
//!
//! Exclusions
//! ----------
//! - Low-level building blocks (weights, cell means, logit likelihood) are
//!   covered by unit tests.
//! - Python bindings.
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use rust_did::{
    did::{
        BootType, Cell, DidError, EstimationWarning, IpwDidOptions, RcData, std_ipw_did_rc,
    },
    inference::CancelFlag,
    optimization::loglik_optimizer::{LineSearcher, MLEOptions, Tolerances},
    propensity::PropensitySolver,
};

/// Purpose
/// -------
/// Simulate a repeated cross-section where treatment probability rises
/// with a covariate and the true ATT is `effect`.
///
/// Design
/// ------
/// - `x ~ N(0, 1)`, `P(d = 1 | x) = logistic(0.2 + 0.6 x)`,
///   `post ~ Bernoulli(0.5)` independent of `(x, d)`.
/// - `y = 1 + x + 0.5 post + 0.8 d + effect · d · post + 0.5 ε`.
///
/// Returns
/// -------
/// - `RcData` with covariates `[1, x]` and unit weights.
fn simulate_rc(n: usize, effect: f64, seed: u64) -> RcData {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut y = Array1::zeros(n);
    let mut post = Array1::zeros(n);
    let mut d = Array1::zeros(n);
    let mut cov = Array2::ones((n, 2));
    for i in 0..n {
        let x: f64 = rng.sample(StandardNormal);
        let p = 1.0 / (1.0 + (-(0.2 + 0.6 * x)).exp());
        let di = if rng.gen::<f64>() < p { 1.0 } else { 0.0 };
        let ti = if rng.gen::<f64>() < 0.5 { 1.0 } else { 0.0 };
        let eps: f64 = rng.sample(StandardNormal);
        y[i] = 1.0 + x + 0.5 * ti + 0.8 * di + effect * di * ti + 0.5 * eps;
        post[i] = ti;
        d[i] = di;
        cov[[i, 1]] = x;
    }
    RcData::new(y, post, d, Some(cov), None).expect("simulated data should validate")
}

/// Purpose
/// -------
/// Balanced design with deterministic cells: `d = i mod 2`,
/// `post = ⌊i/2⌋ mod 2`, and a propensity covariate unrelated to both
/// treatment and outcome.
fn simulate_balanced(n: usize, effect: f64, seed: u64) -> RcData {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let d = Array1::from_shape_fn(n, |i| (i % 2) as f64);
    let post = Array1::from_shape_fn(n, |i| ((i / 2) % 2) as f64);
    let mut cov = Array2::ones((n, 2));
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let x: f64 = rng.sample(StandardNormal);
        let eps: f64 = rng.sample(StandardNormal);
        cov[[i, 1]] = x;
        y[i] = 0.3 * post[i] + 0.2 * d[i] + effect * d[i] * post[i] + 0.4 * eps;
    }
    RcData::new(y, post, d, Some(cov), None).expect("balanced data should validate")
}

fn with_y(data: &RcData, y: Array1<f64>) -> RcData {
    RcData::new(
        y,
        data.post().clone(),
        data.d().clone(),
        Some(data.covariates().clone()),
        Some(data.weights().clone()),
    )
    .expect("shifted data should validate")
}

fn mean(v: &Array1<f64>) -> f64 {
    v.sum() / v.len() as f64
}

#[test]
// Purpose
// -------
// With an intercept-only propensity model the estimator reduces to the
// plain difference of cell means.
//
// Given
// -----
// - Simulated data, covariates replaced by `None`.
//
// Expect
// ------
// - ATT equals (ȳ_tp − ȳ_tpre) − (ȳ_cp − ȳ_cpre) to 1e-10.
fn intercept_only_matches_difference_of_means() {
    // Arrange
    let full = simulate_rc(800, 1.5, 1);
    let data = RcData::new(full.y().clone(), full.post().clone(), full.d().clone(), None, None)
        .expect("valid data");
    let cell_mean = |dv: f64, tv: f64| {
        let (mut s, mut c) = (0.0, 0.0);
        for i in 0..data.n() {
            if data.d()[i] == dv && data.post()[i] == tv {
                s += data.y()[i];
                c += 1.0;
            }
        }
        s / c
    };

    // Act
    let out = std_ipw_did_rc(&data, &IpwDidOptions::default()).expect("estimate");

    // Assert
    let expected =
        (cell_mean(1.0, 1.0) - cell_mean(1.0, 0.0)) - (cell_mean(0.0, 1.0) - cell_mean(0.0, 0.0));
    approx::assert_abs_diff_eq!(out.att, expected, epsilon = 1e-10);
    assert!(out.warnings.is_empty());
}

#[test]
// Purpose
// -------
// Analytic inference is consistent with the returned influence function.
//
// Given
// -----
// - Simulated data (n = 1000), `influence_func = true`.
//
// Expect
// ------
// - se = sd(IF, ddof = 1)/√n; CI = att ± 1.96 se; mean(IF) ≈ 0; the ATT
//   is near the true effect of 1.5.
fn analytic_se_matches_influence_function() {
    let data = simulate_rc(1000, 1.5, 2);
    let opts = IpwDidOptions { influence_func: true, ..IpwDidOptions::default() };

    let out = std_ipw_did_rc(&data, &opts).expect("estimate");

    let inf = out.att_inf_func.as_ref().expect("influence function requested");
    assert_eq!(inf.len(), 1000);
    approx::assert_abs_diff_eq!(mean(inf), 0.0, epsilon = 1e-6);
    approx::assert_relative_eq!(out.se, inf.std(1.0) / 1000_f64.sqrt(), max_relative = 1e-12);
    approx::assert_abs_diff_eq!(out.uci - out.att, 1.96 * out.se, epsilon = 1e-12);
    approx::assert_abs_diff_eq!(out.att - out.lci, 1.96 * out.se, epsilon = 1e-12);
    assert!((out.att - 1.5).abs() < 5.0 * out.se);
}

#[test]
// Purpose
// -------
// Rescaling all observation weights by a constant changes nothing.
//
// Given
// -----
// - The same sample with `None` weights and with weights all equal to 3.
//
// Expect
// ------
// - Matching ATT, SE, and influence function.
fn constant_weights_are_irrelevant() {
    let base = simulate_rc(600, 1.0, 3);
    let scaled = RcData::new(
        base.y().clone(),
        base.post().clone(),
        base.d().clone(),
        Some(base.covariates().clone()),
        Some(Array1::from_elem(600, 3.0)),
    )
    .expect("valid data");
    let opts = IpwDidOptions { influence_func: true, ..IpwDidOptions::default() };

    let a = std_ipw_did_rc(&base, &opts).expect("estimate");
    let b = std_ipw_did_rc(&scaled, &opts).expect("estimate");

    approx::assert_abs_diff_eq!(a.att, b.att, epsilon = 1e-10);
    approx::assert_abs_diff_eq!(a.se, b.se, epsilon = 1e-10);
    let (ia, ib) = (a.att_inf_func.expect("IF"), b.att_inf_func.expect("IF"));
    for (x, y) in ia.iter().zip(ib.iter()) {
        approx::assert_abs_diff_eq!(x, y, epsilon = 1e-8);
    }
}

#[test]
// Purpose
// -------
// Outcome shifts behave as a DiD should.
//
// Given
// -----
// - Simulated data; variant A adds 2 to every treated-post outcome;
//   variant B adds 10 to every outcome.
//
// Expect
// ------
// - A: ATT increases by exactly 2 and the influence function is unchanged.
// - B: ATT and influence function are unchanged.
fn outcome_shifts_move_att_as_expected() {
    // Arrange
    let data = simulate_rc(500, 1.0, 4);
    let opts = IpwDidOptions { influence_func: true, ..IpwDidOptions::default() };
    let cell_shift = Array1::from_shape_fn(data.n(), |i| {
        data.y()[i] + 2.0 * data.d()[i] * data.post()[i]
    });
    let global_shift = data.y() + 10.0;

    // Act
    let base = std_ipw_did_rc(&data, &opts).expect("estimate");
    let a = std_ipw_did_rc(&with_y(&data, cell_shift), &opts).expect("estimate");
    let b = std_ipw_did_rc(&with_y(&data, global_shift), &opts).expect("estimate");

    // Assert
    approx::assert_abs_diff_eq!(a.att, base.att + 2.0, epsilon = 1e-9);
    approx::assert_abs_diff_eq!(b.att, base.att, epsilon = 1e-9);
    let inf = base.att_inf_func.expect("IF");
    for other in [a.att_inf_func.expect("IF"), b.att_inf_func.expect("IF")] {
        for (x, y) in inf.iter().zip(other.iter()) {
            approx::assert_abs_diff_eq!(x, y, epsilon = 1e-8);
        }
    }
}

#[test]
// Purpose
// -------
// Both bootstrap schemes approximate the analytic standard error.
//
// Given
// -----
// - Simulated data (n = 2000), analytic SE as reference.
// - Multiplier bootstrap with B = 1999; weighted bootstrap with B = 999.
//
// Expect
// ------
// - Multiplier SE within 10% and weighted SE within 15% of analytic SE.
// - Replicate arrays have length B; intervals contain the ATT.
fn bootstrap_se_agrees_with_analytic() {
    let data = simulate_rc(2000, 1.0, 5);
    let analytic = std_ipw_did_rc(&data, &IpwDidOptions::default()).expect("estimate");

    let mult_opts = IpwDidOptions::new(true, BootType::Multiplier, 1999, false, 0.995)
        .expect("valid options")
        .with_seed(42);
    let mult = std_ipw_did_rc(&data, &mult_opts).expect("multiplier bootstrap");

    let wb_opts = IpwDidOptions::new(true, BootType::Weighted, 999, false, 0.995)
        .expect("valid options")
        .with_seed(43);
    let wb = std_ipw_did_rc(&data, &wb_opts).expect("weighted bootstrap");

    assert_eq!(mult.att, analytic.att);
    assert_eq!(mult.boots.as_ref().map(|b| b.len()), Some(1999));
    assert_eq!(wb.boots.as_ref().map(|b| b.len()), Some(999));
    approx::assert_relative_eq!(mult.se, analytic.se, max_relative = 0.10);
    approx::assert_relative_eq!(wb.se, analytic.se, max_relative = 0.15);
    assert!(mult.lci < mult.att && mult.att < mult.uci);
    assert!(wb.lci < wb.att && wb.att < wb.uci);
}

#[test]
// Purpose
// -------
// A fixed seed makes bootstrap output reproducible.
//
// Given
// -----
// - The same data and options with seed 7, run twice, for both schemes.
//
// Expect
// ------
// - Identical outcomes.
fn bootstrap_is_reproducible_with_seed() {
    let data = simulate_rc(300, 1.0, 6);
    for boot_type in [BootType::Multiplier, BootType::Weighted] {
        let opts = IpwDidOptions::new(true, boot_type, 99, false, 0.995)
            .expect("valid options")
            .with_seed(7);
        let a = std_ipw_did_rc(&data, &opts).expect("estimate");
        let b = std_ipw_did_rc(&data, &opts).expect("estimate");
        assert_eq!(a, b);
    }
}

#[test]
// Purpose
// -------
// Analytic intervals have close to nominal coverage.
//
// Given
// -----
// - 100 balanced samples of n = 200 with true ATT 2 and noise sd 0.4.
//
// Expect
// ------
// - At least 90 of 100 intervals cover 2; every ATT is within 0.5 of 2.
fn analytic_intervals_have_nominal_coverage() {
    let mut covered = 0;
    for sim in 0..100 {
        let data = simulate_balanced(200, 2.0, 1000 + sim);
        let out = std_ipw_did_rc(&data, &IpwDidOptions::default()).expect("estimate");
        if out.lci <= 2.0 && 2.0 <= out.uci {
            covered += 1;
        }
        assert!((out.att - 2.0).abs() < 0.5, "sim {sim}: att {}", out.att);
    }
    assert!(covered >= 90, "coverage {covered}/100");
}

#[test]
// Purpose
// -------
// The L-BFGS solver reaches the same estimate as Newton.
//
// Given
// -----
// - Simulated data, default Newton vs L-BFGS with tol_grad 1e-8.
//
// Expect
// ------
// - ATTs agree to 1e-3; SEs agree to 1%.
fn lbfgs_solver_matches_newton() {
    let data = simulate_rc(800, 1.0, 8);
    let tols = Tolerances::new(Some(1e-8), None, Some(500)).expect("valid tolerances");
    let mle = MLEOptions::new(tols, LineSearcher::MoreThuente, false, None).expect("valid options");
    let lbfgs = IpwDidOptions::default().with_solver(PropensitySolver::Lbfgs(mle));

    let a = std_ipw_did_rc(&data, &IpwDidOptions::default()).expect("newton");
    let b = std_ipw_did_rc(&data, &lbfgs).expect("l-bfgs");

    approx::assert_abs_diff_eq!(a.att, b.att, epsilon = 1e-3);
    approx::assert_relative_eq!(a.se, b.se, max_relative = 0.01);
}

#[test]
// Purpose
// -------
// Invalid inputs and degenerate designs fail with structured errors.
//
// Given
// -----
// - A negative observation weight; `trim_level = 0`; collinear
//   covariates `[1, x, 2x]`; `trim_level = 1.5`.
// - A sample with no treated unit in the pre period.
// - An unknown bootstrap name.
//
// Expect
// ------
// - `NegativeWeight`, `DegenerateWeights`, `SingularDesign { rank: 2,
//   dim: 3 }`, and `InvalidTrimLevel` respectively.
// - `EmptyCell { cell: TreatedPre }` and `InvalidBootType`.
fn invalid_inputs_are_rejected() {
    let data = simulate_rc(200, 1.0, 9);

    let mut w = Array1::ones(200);
    w[17] = -1.0;
    let neg = RcData::new(data.y().clone(), data.post().clone(), data.d().clone(), None, Some(w));
    assert_eq!(neg, Err(DidError::NegativeWeight { index: 17, value: -1.0 }));

    let trimmed = IpwDidOptions { trim_level: 0.0, ..IpwDidOptions::default() };
    assert!(matches!(
        std_ipw_did_rc(&data, &trimmed),
        Err(DidError::DegenerateWeights { .. })
    ));

    let x = data.covariates().column(1).to_owned();
    let collinear = Array2::from_shape_fn((200, 3), |(i, j)| match j {
        0 => 1.0,
        1 => x[i],
        _ => 2.0 * x[i],
    });
    let singular = RcData::new(
        data.y().clone(),
        data.post().clone(),
        data.d().clone(),
        Some(collinear),
        None,
    )
    .expect("valid data");
    assert_eq!(
        std_ipw_did_rc(&singular, &IpwDidOptions::default()),
        Err(DidError::SingularDesign { rank: 2, dim: 3 })
    );

    let bad_trim = IpwDidOptions { trim_level: 1.5, ..IpwDidOptions::default() };
    assert_eq!(
        std_ipw_did_rc(&data, &bad_trim),
        Err(DidError::InvalidTrimLevel { value: 1.5 })
    );

    let no_treated_pre = RcData::new(
        Array1::from_shape_fn(6, |i| (i + 1) as f64),
        Array1::from(vec![1.0, 1.0, 0.0, 1.0, 0.0, 1.0]),
        Array1::from(vec![1.0, 1.0, 0.0, 0.0, 0.0, 0.0]),
        None,
        None,
    );
    assert_eq!(no_treated_pre, Err(DidError::EmptyCell { cell: Cell::TreatedPre }));

    assert_eq!(
        "bayesian".parse::<BootType>(),
        Err(DidError::InvalidBootType { value: "bayesian".to_string() })
    );
}

#[test]
// Purpose
// -------
// A full-rank covariate measured on a large scale (calendar years) is
// accepted and gives the same estimate as its centered version.
//
// Given
// -----
// - Balanced design, n = 400, covariates `[1, 2000 + (i mod 11)]`.
// - The same sample with covariates `[1, (i mod 11) − 5]`.
//
// Expect
// ------
// - Both runs succeed without a pseudo-inverse warning.
// - ATTs agree to 1e-5; SEs agree to 0.1%.
fn large_magnitude_covariate_is_accepted() {
    // Arrange
    let base = simulate_balanced(400, 1.0, 12);
    let with_cov = |shift: f64| {
        let cov = Array2::from_shape_fn((400, 2), |(i, j)| {
            if j == 0 { 1.0 } else { (i % 11) as f64 + shift }
        });
        RcData::new(base.y().clone(), base.post().clone(), base.d().clone(), Some(cov), None)
            .expect("valid data")
    };
    let years = with_cov(2000.0);
    let centered = with_cov(-5.0);

    // Act
    let a = std_ipw_did_rc(&years, &IpwDidOptions::default()).expect("full-rank design");
    let b = std_ipw_did_rc(&centered, &IpwDidOptions::default()).expect("full-rank design");

    // Assert
    let singular = |w: &EstimationWarning| matches!(w, EstimationWarning::SingularHessian { .. });
    assert!(!a.warnings.iter().any(singular));
    assert!(!b.warnings.iter().any(singular));
    approx::assert_abs_diff_eq!(a.att, b.att, epsilon = 1e-5);
    approx::assert_relative_eq!(a.se, b.se, max_relative = 1e-3);
}

#[test]
// Purpose
// -------
// A nearly collinear but full-rank design passes the rank check, and its
// ill-conditioned information matrix is inverted through the
// pseudo-inverse with a warning instead of an error.
//
// Given
// -----
// - Simulated data with covariates `[1, x, x + 1e-5 · u]`, `u ~ N(0, 1)`.
//
// Expect
// ------
// - `Ok` with a `SingularHessian` warning.
// - Finite ATT and a finite, positive SE.
fn near_collinear_design_warns_and_uses_pseudo_inverse() {
    // Arrange
    let data = simulate_rc(400, 1.0, 13);
    let mut rng = ChaCha8Rng::seed_from_u64(14);
    let x = data.covariates().column(1).to_owned();
    let cov = Array2::from_shape_fn((400, 3), |(i, j)| match j {
        0 => 1.0,
        1 => x[i],
        _ => x[i] + 1e-5 * rng.sample::<f64, _>(StandardNormal),
    });
    let near = RcData::new(data.y().clone(), data.post().clone(), data.d().clone(), Some(cov), None)
        .expect("valid data");

    // Act
    let out = std_ipw_did_rc(&near, &IpwDidOptions::default()).expect("full-rank design");

    // Assert
    assert!(
        out.warnings.iter().any(|w| matches!(w, EstimationWarning::SingularHessian { .. }))
    );
    assert!(out.att.is_finite());
    assert!(out.se.is_finite() && out.se > 0.0);
}

#[test]
// Purpose
// -------
// A cancelled flag aborts a bootstrap run without partial results.
//
// Given
// -----
// - A flag cancelled before the call; weighted bootstrap with B = 500.
//
// Expect
// ------
// - `Err(DidError::Cancelled)`.
fn cancellation_aborts_bootstrap() {
    let data = simulate_rc(300, 1.0, 10);
    let flag = CancelFlag::new();
    flag.cancel();
    let opts = IpwDidOptions::new(true, BootType::Weighted, 500, false, 0.995)
        .expect("valid options")
        .with_cancel_flag(flag);
    assert_eq!(std_ipw_did_rc(&data, &opts), Err(DidError::Cancelled));
}
