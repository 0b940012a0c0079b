//! IPW weight construction with propensity trimming.
//!
//! Purpose
//! -------
//! Build the four group-period weight vectors of the standardized IPW DiD
//! estimator from observation weights and clipped propensity scores.
//!
//! Key behaviors
//! -------------
//! - Trimming keeps every treated unit and keeps a control unit iff
//!   `psᵢ < trim_level`.
//! - `treated_pre  = trim · w · d · (1 − post)`
//! - `treated_post = trim · w · d · post`
//! - `control_pre  = trim · w · ps · (1 − d) · (1 − post) / (1 − ps)`
//! - `control_post = trim · w · ps · (1 − d) · post / (1 − ps)`
//!
//! Invariants & assumptions
//! ------------------------
//! - `ps` is clipped to `[1e-6, 1 − 1e-6]`, so the odds are finite.
//! - Every vector is non-negative and zero outside its cell. No
//!   normalization happens here; the Hajek means divide by the cell mass.
use crate::did::{att::Cell, data::RcData};
use ndarray::{Array1, Zip};

/// The four weight vectors, each of length `n`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSet {
    pub treated_pre: Array1<f64>,
    pub treated_post: Array1<f64>,
    pub control_pre: Array1<f64>,
    pub control_post: Array1<f64>,
}

impl WeightSet {
    /// Build the trimmed IPW weights for `data` given clipped scores `pscore`.
    pub fn build(data: &RcData, pscore: &Array1<f64>, trim_level: f64) -> Self {
        let n = data.n();
        let mut ws = Self {
            treated_pre: Array1::zeros(n),
            treated_post: Array1::zeros(n),
            control_pre: Array1::zeros(n),
            control_post: Array1::zeros(n),
        };

        Zip::indexed(data.weights()).for_each(|i, &w| {
            let d = data.d()[i];
            let post = data.post()[i];
            let ps = pscore[i];
            let keep = d == 1.0 || ps < trim_level;
            if !keep {
                return;
            }
            let odds = ps / (1.0 - ps);
            ws.treated_pre[i] = w * d * (1.0 - post);
            ws.treated_post[i] = w * d * post;
            ws.control_pre[i] = w * odds * (1.0 - d) * (1.0 - post);
            ws.control_post[i] = w * odds * (1.0 - d) * post;
        });
        ws
    }

    pub fn get(&self, cell: Cell) -> &Array1<f64> {
        match cell {
            Cell::TreatedPre => &self.treated_pre,
            Cell::TreatedPost => &self.treated_post,
            Cell::ControlPre => &self.control_pre,
            Cell::ControlPost => &self.control_post,
        }
    }
}
