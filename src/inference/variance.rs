//! inference::variance — standard errors and confidence intervals.
//!
//! Purpose
//! -------
//! Turn an influence function or bootstrap replicates into a standard error
//! and a confidence interval, and dispatch between the analytic and the two
//! bootstrap methods according to the estimator options.
//!
//! Key behaviors
//! -------------
//! - Analytic: `se = sd(IF, ddof = 1) / √n`, `CI = att ± 1.96 · se`.
//! - Bootstrap: `se = IQR(dev) / (Φ⁻¹(0.75) − Φ⁻¹(0.25))`,
//!   `cv = q₀.₉₅(|dev / se|)`, `CI = att ± cv · se`, where `dev` are the
//!   multiplier replicates or the weighted replicates minus `att`.
//! - Non-finite deviations are dropped before the IQR and the quantile.
//!
//! Conventions
//! -----------
//! - Quantiles use linear interpolation between order statistics
//!   (Hyndman–Fan type 7).
//! - A zero bootstrap scale collapses the interval onto `att`.
use crate::{
    did::{
        data::RcData,
        errors::{DidError, DidResult},
        options::{BootType, IpwDidOptions},
        std_ipw::Collaborators,
    },
};
use ndarray::Array1;
use statrs::distribution::{ContinuousCDF, Normal};

/// Two-sided normal critical value for the analytic 95% interval.
pub const Z_95: f64 = 1.96;

/// Standard error and confidence bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub se: f64,
    pub lci: f64,
    pub uci: f64,
}

/// Analytic interval from the influence function.
pub fn analytic_interval(att: f64, inf_func: &Array1<f64>) -> Interval {
    let n = inf_func.len() as f64;
    let se = inf_func.std(1.0) / n.sqrt();
    Interval { se, lci: att - Z_95 * se, uci: att + Z_95 * se }
}

/// Robust bootstrap interval from centered replicates.
///
/// # Errors
/// - [`DidError::NoValidReplicates`] if no deviation is finite.
pub fn bootstrap_interval(att: f64, deviations: &Array1<f64>) -> DidResult<Interval> {
    let mut finite: Vec<f64> = deviations.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return Err(DidError::NoValidReplicates { nboot: deviations.len() });
    }
    let dropped = deviations.len() - finite.len();
    if dropped > 0 {
        tracing::debug!(dropped, "non-finite bootstrap replicates omitted");
    }
    finite.sort_by(f64::total_cmp);

    let normal = Normal::new(0.0, 1.0)?;
    let scale = normal.inverse_cdf(0.75) - normal.inverse_cdf(0.25);
    let iqr = quantile_sorted(&finite, 0.75) - quantile_sorted(&finite, 0.25);
    let se = iqr / scale;
    if !(se > 0.0) {
        return Ok(Interval { se: 0.0, lci: att, uci: att });
    }

    let mut scaled: Vec<f64> = finite.iter().map(|v| (v / se).abs()).collect();
    scaled.sort_by(f64::total_cmp);
    let cv = quantile_sorted(&scaled, 0.95);
    Ok(Interval { se, lci: att - cv * se, uci: att + cv * se })
}

/// Dispatch to the configured variance method.
///
/// Returns the interval and, for the bootstrap methods, the raw replicates
/// as produced by the engine.
pub fn estimate_variance(
    att: f64, inf_func: &Array1<f64>, data: &RcData, opts: &IpwDidOptions,
    collab: &Collaborators<'_>,
) -> DidResult<(Interval, Option<Array1<f64>>)> {
    if !opts.boot {
        return Ok((analytic_interval(att, inf_func), None));
    }
    match opts.boot_type {
        BootType::Multiplier => {
            let boots = collab.multiplier.replicates(inf_func, opts.nboot)?;
            let interval = bootstrap_interval(att, &boots)?;
            Ok((interval, Some(boots)))
        }
        BootType::Weighted => {
            let boots = collab.weighted.replicates(data, opts.nboot, opts.trim_level)?;
            let deviations = &boots - att;
            let interval = bootstrap_interval(att, &deviations)?;
            Ok((interval, Some(boots)))
        }
    }
}

/// Type-7 quantile of an ascending, non-empty slice.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The analytic standard error formula.
    // - Type-7 quantiles.
    // - Robust bootstrap scale, NaN omission, and degenerate inputs.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Analytic SE is sd(IF, ddof = 1)/√n and the CI is symmetric at 1.96.
    //
    // Given
    // -----
    // - IF = (1, −1, 1, −1): sample variance 4/3, n = 4.
    //
    // Expect
    // ------
    // - se = sqrt(4/3)/2; uci − att = 1.96·se.
    fn analytic_interval_uses_sample_sd() {
        let iv = analytic_interval(0.5, &array![1.0, -1.0, 1.0, -1.0]);
        assert_abs_diff_eq!(iv.se, (4.0_f64 / 3.0).sqrt() / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(iv.uci - 0.5, 1.96 * iv.se, epsilon = 1e-12);
        assert_abs_diff_eq!(0.5 - iv.lci, 1.96 * iv.se, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Quantiles interpolate linearly between order statistics.
    //
    // Given
    // -----
    // - Sorted (1, 2, 3, 4, 5).
    //
    // Expect
    // ------
    // - q0.25 = 2, q0.75 = 4, q0.95 = 4.8, q1 = 5.
    fn quantile_sorted_matches_type_seven() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_abs_diff_eq!(quantile_sorted(&v, 0.25), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(quantile_sorted(&v, 0.75), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(quantile_sorted(&v, 0.95), 4.8, epsilon = 1e-12);
        assert_abs_diff_eq!(quantile_sorted(&v, 1.0), 5.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // NaN replicates do not change the bootstrap interval.
    //
    // Given
    // -----
    // - Deviations (−2, −1, 0, 1, 2) with and without two NaNs.
    //
    // Expect
    // ------
    // - Identical intervals; se = 2 / 1.34898 (IQR over normal IQR).
    fn bootstrap_interval_omits_non_finite_replicates() {
        let clean = bootstrap_interval(1.0, &array![-2.0, -1.0, 0.0, 1.0, 2.0]).expect("interval");
        let noisy = bootstrap_interval(1.0, &array![-2.0, f64::NAN, -1.0, 0.0, 1.0, f64::NAN, 2.0])
            .expect("interval");
        assert_eq!(clean, noisy);
        assert_abs_diff_eq!(clean.se, 2.0 / 1.348_979_5, epsilon = 1e-6);
        assert!(clean.lci < 1.0 && clean.uci > 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Degenerate replicate sets are handled explicitly.
    //
    // Given
    // -----
    // - All-NaN deviations; all-zero deviations.
    //
    // Expect
    // ------
    // - `NoValidReplicates`; a zero-width interval at att.
    fn bootstrap_interval_handles_degenerate_replicates() {
        assert_eq!(
            bootstrap_interval(0.0, &array![f64::NAN, f64::NAN]),
            Err(DidError::NoValidReplicates { nboot: 2 })
        );
        let flat = bootstrap_interval(3.0, &array![0.0, 0.0, 0.0]).expect("interval");
        assert_eq!(flat, Interval { se: 0.0, lci: 3.0, uci: 3.0 });
    }
}
