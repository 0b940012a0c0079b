//! Estimator configuration: inference method, trimming, replicates, seed,
//! propensity solver, and cancellation.
use crate::{
    did::errors::{DidError, DidResult},
    inference::bootstrap::CancelFlag,
    propensity::PropensitySolver,
};
use std::str::FromStr;

/// Bootstrap flavour used when `boot` is enabled.
///
/// Parsing is case-insensitive: `"weighted"` or `"multiplier"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BootType {
    /// Re-estimate the whole model under random observation weights.
    #[default]
    Weighted,
    /// Perturb the influence function with i.i.d. multipliers.
    Multiplier,
}

impl BootType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BootType::Weighted => "weighted",
            BootType::Multiplier => "multiplier",
        }
    }
}

impl std::fmt::Display for BootType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BootType {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weighted" => Ok(BootType::Weighted),
            "multiplier" => Ok(BootType::Multiplier),
            _ => Err(DidError::InvalidBootType { value: s.to_string() }),
        }
    }
}

/// Options for the standardized IPW DiD estimator.
///
/// Fields
/// ------
/// - `boot`: bootstrap inference instead of the analytic influence-function
///   variance.
/// - `boot_type`: which bootstrap to run when `boot` is set.
/// - `nboot`: number of bootstrap replicates.
/// - `influence_func`: return the per-unit influence function.
/// - `trim_level`: control units with propensity score `≥ trim_level` are
///   dropped.
/// - `seed`: bootstrap seed; `None` draws one from OS entropy.
/// - `solver`: propensity-score solver.
/// - `cancel`: optional shared flag to abort a running bootstrap.
///
/// Default
/// -------
/// `boot = false`, `boot_type = Weighted`, `nboot = 999`,
/// `influence_func = false`, `trim_level = 0.995`, `seed = None`,
/// `solver = Newton`, `cancel = None`.
#[derive(Debug, Clone)]
pub struct IpwDidOptions {
    pub boot: bool,
    pub boot_type: BootType,
    pub nboot: usize,
    pub influence_func: bool,
    pub trim_level: f64,
    pub seed: Option<u64>,
    pub solver: PropensitySolver,
    pub cancel: Option<CancelFlag>,
}

impl Default for IpwDidOptions {
    fn default() -> Self {
        Self {
            boot: false,
            boot_type: BootType::Weighted,
            nboot: 999,
            influence_func: false,
            trim_level: 0.995,
            seed: None,
            solver: PropensitySolver::default(),
            cancel: None,
        }
    }
}

impl IpwDidOptions {
    /// Validated constructor for the core settings; the remaining fields
    /// take their defaults and can be set with the `with_*` builders.
    ///
    /// # Errors
    /// - [`DidError::InvalidTrimLevel`] unless `trim_level` is finite and in
    ///   `[0, 1]`.
    /// - [`DidError::InvalidReplicates`] if `boot` is set and `nboot == 0`.
    pub fn new(
        boot: bool, boot_type: BootType, nboot: usize, influence_func: bool, trim_level: f64,
    ) -> DidResult<Self> {
        let opts = Self { boot, boot_type, nboot, influence_func, trim_level, ..Self::default() };
        opts.validate()?;
        Ok(opts)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_solver(mut self, solver: PropensitySolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Re-check the invariants enforced by [`IpwDidOptions::new`]; the entry
    /// points call this since fields are public.
    pub fn validate(&self) -> DidResult<()> {
        if !self.trim_level.is_finite() || !(0.0..=1.0).contains(&self.trim_level) {
            return Err(DidError::InvalidTrimLevel { value: self.trim_level });
        }
        if self.boot && self.nboot == 0 {
            return Err(DidError::InvalidReplicates { nboot: self.nboot });
        }
        Ok(())
    }
}
