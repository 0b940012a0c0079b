//! Influence function of the standardized IPW DiD estimator.
//!
//! Purpose
//! -------
//! Build the per-unit influence function whose empirical variance over `n`
//! is the plug-in asymptotic variance of the ATT, including the correction
//! for estimating the propensity score.
//!
//! Key behaviors
//! -------------
//! - Leading term per cell: `(w ∘ (y − μ)) / mean(w)`, where `μ` is the
//!   cell's Hajek mean computed once in [`CellMeans`].
//! - `inf_treat = lead(treated_post) − lead(treated_pre)`;
//!   `inf_cont = lead(control_post) − lead(control_pre)`.
//! - `m2(period) = X'(w_cont ∘ (y − μ_cont)) / Σ w_cont`, and the
//!   estimation-effect term is `asy_lin_rep · (m2(post) − m2(pre))`.
//! - `IF = inf_treat − (inf_cont + correction)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Cell means come from the same [`WeightSet`] passed here; every cell
//!   sum is positive (enforced when the means were computed).
//! - `asy_lin_rep` is `n × k` with `k` equal to the number of covariates.
use crate::did::{
    att::{Cell, CellMeans},
    data::RcData,
    weights::WeightSet,
};
use ndarray::{Array1, Array2};

/// Per-unit influence function.
pub fn influence_function(
    data: &RcData, weights: &WeightSet, means: &CellMeans, asy_lin_rep: &Array2<f64>,
) -> Array1<f64> {
    let y = data.y();
    let lead = |cell: Cell| leading_term(weights.get(cell), y, means.get(cell));

    let inf_treat = lead(Cell::TreatedPost) - lead(Cell::TreatedPre);
    let inf_cont = lead(Cell::ControlPost) - lead(Cell::ControlPre);

    let m2 = |cell: Cell| {
        let w = weights.get(cell);
        let centered = w * &(y - means.get(cell));
        data.covariates().t().dot(&centered) / w.sum()
    };
    let correction = asy_lin_rep.dot(&(m2(Cell::ControlPost) - m2(Cell::ControlPre)));

    inf_treat - (inf_cont + correction)
}

/// `(w ∘ (y − μ)) / mean(w)`: the cell's influence without estimation effect.
fn leading_term(w: &Array1<f64>, y: &Array1<f64>, mean: f64) -> Array1<f64> {
    let mean_w = w.sum() / w.len() as f64;
    (w * &(y - mean)) / mean_w
}
