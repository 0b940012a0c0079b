//! rust_did — standardized IPW difference-in-differences with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the repeated cross-section IPW DiD estimator to Python via the
//! `_rust_did` extension module when the `python-bindings` feature is
//! enabled.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules:
//!   - `did`: data container, weights, Hajek means, influence function, and
//!     the [`did::std_ipw_did_rc`] entry point.
//!   - `propensity`: weighted logit model with Newton and L-BFGS solvers.
//!   - `inference`: analytic and bootstrap standard errors.
//!   - `optimization`: the argmin-based maximum-likelihood driver.
//! - Define the `StdIpwDidRc` `#[pyclass]` and the `#[pymodule]` initializer.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs FFI
//!   glue, input conversion, and error mapping only.
//! - Estimation runs with the GIL released.
//!
//! Conventions
//! -----------
//! - Python-exposed classes live under `_rust_did.did` and are registered in
//!   `sys.modules` as `rust_did.did`.
//! - Errors from core Rust code surface as `ValueError`; malformed array
//!   inputs surface as `TypeError`.
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner modules
//!   and by the integration tests under `tests/`.

pub mod did;
pub mod inference;
pub mod optimization;
pub mod propensity;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{
    prelude::*,
    types::{PyAny, PyDict},
};

#[cfg(feature = "python-bindings")]
use crate::{
    did::{IpwDidOutcome, std_ipw_did_rc},
    utils::{extract_ipw_options, extract_rc_data},
};

/// StdIpwDidRc — Python-facing wrapper for the standardized IPW DiD estimator.
///
/// Purpose
/// -------
/// Run [`std_ipw_did_rc`] on Python array-likes and expose the outcome as
/// read-only properties.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `StdIpwDidRc(y, post, D, covariates=None, i_weights=None, boot=False,
/// boot_type="weighted", nboot=999, influence_func=False, trim_level=0.995,
/// seed=None)`:
/// - `y`, `post`, `D`: 1-D array-likes of equal length `n`; `post` and `D`
///   hold 0/1.
/// - `covariates`: optional `n × k` array-like including the intercept
///   column; `None` means intercept only.
/// - `i_weights`: optional non-negative observation weights.
/// - `boot_type`: `"weighted"` or `"multiplier"`.
/// - `seed`: optional bootstrap seed; drawn at random when `None`.
///
/// Notes
/// -----
/// - Native Rust callers should use [`std_ipw_did_rc`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_did.did", frozen)]
pub struct StdIpwDidRc {
    inner: IpwDidOutcome,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl StdIpwDidRc {
    #[new]
    #[pyo3(
        signature = (
            y,
            post,
            d,
            covariates = None,
            i_weights = None,
            boot = false,
            boot_type = "weighted",
            nboot = 999,
            influence_func = false,
            trim_level = 0.995,
            seed = None,
        ),
        text_signature = "(y, post, D, /, covariates=None, i_weights=None, boot=False, \
                          boot_type='weighted', nboot=999, influence_func=False, \
                          trim_level=0.995, seed=None)"
    )]
    pub fn new<'py>(
        py: Python<'py>, y: &Bound<'py, PyAny>, post: &Bound<'py, PyAny>, d: &Bound<'py, PyAny>,
        covariates: Option<&Bound<'py, PyAny>>, i_weights: Option<&Bound<'py, PyAny>>,
        boot: bool, boot_type: &str, nboot: usize, influence_func: bool, trim_level: f64,
        seed: Option<u64>,
    ) -> PyResult<Self> {
        let data = extract_rc_data(py, y, post, d, covariates, i_weights)?;
        let opts = extract_ipw_options(boot, boot_type, nboot, influence_func, trim_level, seed)?;
        let inner = py.allow_threads(|| std_ipw_did_rc(&data, &opts))?;
        Ok(StdIpwDidRc { inner })
    }

    #[getter]
    pub fn att(&self) -> f64 {
        self.inner.att
    }

    #[getter]
    pub fn se(&self) -> f64 {
        self.inner.se
    }

    #[getter]
    pub fn uci(&self) -> f64 {
        self.inner.uci
    }

    #[getter]
    pub fn lci(&self) -> f64 {
        self.inner.lci
    }

    /// Bootstrap replicates, or `None` for analytic inference.
    #[getter]
    pub fn boots(&self) -> Option<Vec<f64>> {
        self.inner.boots.as_ref().map(|b| b.to_vec())
    }

    /// Per-unit influence function, when requested.
    #[getter]
    pub fn att_inf_func(&self) -> Option<Vec<f64>> {
        self.inner.att_inf_func.as_ref().map(|v| v.to_vec())
    }

    #[getter]
    pub fn args<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let args = &self.inner.args;
        let dict = PyDict::new(py);
        dict.set_item("panel", args.panel)?;
        dict.set_item("normalized", args.normalized)?;
        dict.set_item("boot", args.boot)?;
        dict.set_item("boot_type", args.boot_type.as_str())?;
        dict.set_item("nboot", args.nboot)?;
        dict.set_item("type", args.estimator)?;
        dict.set_item("trim_level", args.trim_level)?;
        Ok(dict)
    }

    #[getter]
    pub fn warnings(&self) -> Vec<String> {
        self.inner.warnings.iter().map(ToString::to_string).collect()
    }

    fn __repr__(&self) -> String {
        format!(
            "StdIpwDidRc(att={:.6}, se={:.6}, lci={:.6}, uci={:.6})",
            self.inner.att, self.inner.se, self.inner.lci, self.inner.uci
        )
    }
}

/// _rust_did — PyO3 module initializer for the Python extension.
///
/// Creates the `did` submodule, attaches it to `_rust_did`, and registers it
/// in `sys.modules` so `rust_did.did` is importable with dot notation.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_did<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let did_mod = PyModule::new(_py, "did")?;
    did_models(_py, m, &did_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_did.did", did_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn did_models<'py>(
    _py: Python, rust_did: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<StdIpwDidRc>()?;
    rust_did.add_submodule(m)?;
    Ok(())
}
