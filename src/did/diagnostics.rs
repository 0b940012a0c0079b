//! Non-fatal estimation warnings and the accumulator that carries them
//! alongside the computation.
//!
//! Every pushed warning is emitted once through `tracing::warn!` and kept
//! for the outcome, so callers can inspect them without a subscriber.

/// A condition that does not stop estimation but weakens its guarantees.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimationWarning {
    /// The propensity solver stopped on its iteration cap; the last
    /// iterate is used.
    NonConvergence { iterations: usize },
    /// The propensity information matrix was not invertible; its
    /// pseudo-inverse is used in the influence function.
    SingularHessian { min_eigenvalue: f64 },
}

impl std::fmt::Display for EstimationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimationWarning::NonConvergence { iterations } => {
                write!(f, "Propensity score model did not converge after {iterations} iterations.")
            }
            EstimationWarning::SingularHessian { min_eigenvalue } => {
                write!(
                    f,
                    "Failed to invert Hessian matrix (min eigenvalue {min_eigenvalue:e}). Using pseudo-inverse."
                )
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    warnings: Vec<EstimationWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, warning: EstimationWarning) {
        tracing::warn!(%warning, "non-fatal estimation warning");
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[EstimationWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<EstimationWarning> {
        self.warnings
    }
}
