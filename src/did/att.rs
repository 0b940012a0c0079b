//! Hajek group-period means and the ATT point estimate.
//!
//! A cell mean is `mean(w · y) / mean(w)` over the cell's weight vector.
//! The ATT is `(treated_post − treated_pre) − (control_post − control_pre)`.
use crate::did::{
    errors::{DidError, DidResult},
    weights::WeightSet,
};
use ndarray::Array1;

/// Group-period cell of the 2×2 design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    TreatedPre,
    TreatedPost,
    ControlPre,
    ControlPost,
}

impl Cell {
    pub const ALL: [Cell; 4] = [Cell::TreatedPre, Cell::TreatedPost, Cell::ControlPre, Cell::ControlPost];

    /// Whether a unit with group indicator `d` and period indicator `post`
    /// belongs to this cell.
    pub fn contains(self, d: f64, post: f64) -> bool {
        let (treated, after) = match self {
            Cell::TreatedPre => (true, false),
            Cell::TreatedPost => (true, true),
            Cell::ControlPre => (false, false),
            Cell::ControlPost => (false, true),
        };
        (d == 1.0) == treated && (post == 1.0) == after
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Cell::TreatedPre => "treated-pre",
            Cell::TreatedPost => "treated-post",
            Cell::ControlPre => "control-pre",
            Cell::ControlPost => "control-post",
        };
        f.write_str(name)
    }
}

/// The four Hajek cell means, each computed once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMeans {
    pub treated_pre: f64,
    pub treated_post: f64,
    pub control_pre: f64,
    pub control_post: f64,
}

impl CellMeans {
    /// Compute every cell mean.
    ///
    /// # Errors
    /// - [`DidError::DegenerateWeights`] naming the first cell (in
    ///   [`Cell::ALL`] order) whose weights sum to zero.
    pub fn compute(weights: &WeightSet, y: &Array1<f64>) -> DidResult<Self> {
        Ok(Self {
            treated_pre: hajek_mean(weights.get(Cell::TreatedPre), y, Cell::TreatedPre)?,
            treated_post: hajek_mean(weights.get(Cell::TreatedPost), y, Cell::TreatedPost)?,
            control_pre: hajek_mean(weights.get(Cell::ControlPre), y, Cell::ControlPre)?,
            control_post: hajek_mean(weights.get(Cell::ControlPost), y, Cell::ControlPost)?,
        })
    }

    pub fn get(&self, cell: Cell) -> f64 {
        match cell {
            Cell::TreatedPre => self.treated_pre,
            Cell::TreatedPost => self.treated_post,
            Cell::ControlPre => self.control_pre,
            Cell::ControlPost => self.control_post,
        }
    }

    pub fn att(&self) -> f64 {
        (self.treated_post - self.treated_pre) - (self.control_post - self.control_pre)
    }
}

/// `mean(w · y) / mean(w)`, i.e. `Σ wᵢ yᵢ / Σ wᵢ`.
pub fn hajek_mean(w: &Array1<f64>, y: &Array1<f64>, cell: Cell) -> DidResult<f64> {
    let total = w.sum();
    if !(total > 0.0) {
        return Err(DidError::DegenerateWeights { cell });
    }
    Ok(w.dot(y) / total)
}
