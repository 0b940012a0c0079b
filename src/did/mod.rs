//! did — standardized IPW difference-in-differences for repeated cross-sections.
//!
//! Purpose
//! -------
//! Estimate the average treatment effect on the treated (ATT) in a 2×2
//! design (treated/control × pre/post) when each period is a fresh sample,
//! using inverse propensity weights normalized within each group-period
//! cell (Hajek means), with analytic or bootstrap inference.
//!
//! Key behaviors
//! -------------
//! - [`RcData`] validates and normalizes the raw sample once.
//! - [`IpwDidOptions`] carries the inference and trimming configuration.
//! - [`WeightSet`] and [`CellMeans`] build the trimmed IPW weights and the
//!   four Hajek means; [`influence_function`] linearizes the estimator.
//! - [`std_ipw_did_rc`] runs the full pipeline and returns an
//!   [`IpwDidOutcome`] with any [`EstimationWarning`]s.
//!
//! Invariants & assumptions
//! ------------------------
//! - The ATT is `(μ_tp − μ_tpre) − (μ_cp − μ_cpre)`; each μ is a ratio of
//!   weighted sums over a cell with positive total weight.
//! - Treated units are never trimmed; controls with `ps ≥ trim_level` are.
//!
//! Conventions
//! -----------
//! - Indicators are `f64` arrays holding 0.0/1.0 so they combine directly
//!   with weights in elementwise products.
//! - Covariates include the intercept column when one is wanted.
//!
//! Downstream usage
//! ----------------
//! - `use rust_did::did::prelude::*;` imports the estimator surface.

pub mod att;
pub mod data;
pub mod diagnostics;
pub mod errors;
pub mod influence;
pub mod options;
pub mod std_ipw;
pub mod weights;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::att::{Cell, CellMeans, hajek_mean};
pub use self::data::RcData;
pub use self::diagnostics::{Diagnostics, EstimationWarning};
pub use self::errors::{DidError, DidResult};
pub use self::influence::influence_function;
pub use self::options::{BootType, IpwDidOptions};
pub use self::std_ipw::{
    Collaborators, IpwDidArgs, IpwDidOutcome, std_ipw_att, std_ipw_did_rc, std_ipw_did_rc_with,
};
pub use self::weights::WeightSet;

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::{
        BootType, DidError, DidResult, EstimationWarning, IpwDidOptions, IpwDidOutcome, RcData,
        std_ipw_did_rc,
    };
}
