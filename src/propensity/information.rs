//! propensity::information — weighted Gram matrices and their inverses.
//!
//! Purpose
//! -------
//! Linear algebra behind the logit fit and its linearization: build
//! `X' diag(v) X`, measure its numerical rank, solve Newton systems, and
//! invert the information matrix with a pseudo-inverse fallback.
//!
//! Key behaviors
//! -------------
//! - [`weighted_gram`] forms `X' diag(v) X` in `ndarray`.
//! - Matrices are copied into `nalgebra::DMatrix` with [`fill_dmatrix`] for
//!   Cholesky and symmetric eigendecomposition.
//! - [`invert_information`] tries a Cholesky inverse first; when the
//!   matrix is not numerically positive definite, or is ill-conditioned
//!   after rescaling, it returns the eigen-truncated Moore–Penrose inverse
//!   and flags the fallback.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs to the solvers are square and symmetric up to rounding; only
//!   the lower triangle is read.
//! - Rank and conditioning are measured on the unit-diagonal rescaling
//!   `D^{-1/2} A D^{-1/2}`, so covariate units do not matter.
//! - An eigenvalue `λ ≤ EIGEN_EPS · λ_max` is treated as zero, both for
//!   the rank and for pseudo-inverse directions.
use crate::optimization::numerical_stability::{EIGEN_EPS, INFO_RCOND};
use nalgebra::{DMatrix, DVector, SymmetricEigen};
use ndarray::{Array1, Array2, Axis};

/// Inverse of a symmetric information matrix.
///
/// - `matrix`: the inverse (or pseudo-inverse).
/// - `pseudo`: `true` when the Cholesky inverse failed and the
///   eigen-truncated pseudo-inverse was used.
/// - `min_eigenvalue`: smallest eigenvalue seen on the fallback path;
///   `None` on the Cholesky path.
#[derive(Debug, Clone, PartialEq)]
pub struct InformationInverse {
    pub matrix: Array2<f64>,
    pub pseudo: bool,
    pub min_eigenvalue: Option<f64>,
}

/// `X' diag(v) X`.
pub fn weighted_gram(x: &Array2<f64>, v: &Array1<f64>) -> Array2<f64> {
    let xv = x * &v.view().insert_axis(Axis(1));
    x.t().dot(&xv)
}

/// Numerical rank of a symmetric positive semi-definite matrix.
///
/// Eigenvalues are taken on the unit-diagonal rescaling of `a`. A zero
/// diagonal entry leaves a zero row and counts as a lost dimension.
pub fn numerical_rank(a: &Array2<f64>) -> usize {
    let eig = SymmetricEigen::new(to_dmatrix(&unit_diagonal(a)));
    let cutoff = eigen_cutoff(&eig.eigenvalues);
    eig.eigenvalues.iter().filter(|&&lambda| lambda > cutoff).count()
}

/// `λ_min / λ_max` of the unit-diagonal rescaling of `a`; 0 for a zero
/// matrix.
pub fn reciprocal_condition(a: &Array2<f64>) -> f64 {
    let eig = SymmetricEigen::new(to_dmatrix(&unit_diagonal(a)));
    let max = eig.eigenvalues.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return 0.0;
    }
    let min = eig.eigenvalues.iter().copied().fold(f64::INFINITY, f64::min);
    (min / max).max(0.0)
}

/// Solve `A s = b` for symmetric `A`, by Cholesky when possible and by the
/// truncated pseudo-inverse otherwise.
pub fn solve_symmetric(a: &Array2<f64>, b: &Array1<f64>) -> Array1<f64> {
    let a_nalg = to_dmatrix(a);
    let b_nalg = DVector::from_iterator(b.len(), b.iter().copied());
    let s = match a_nalg.clone().cholesky() {
        Some(chol) => chol.solve(&b_nalg),
        None => pseudo_inverse(&SymmetricEigen::new(a_nalg)) * b_nalg,
    };
    Array1::from_iter(s.iter().copied())
}

/// Invert a symmetric information matrix, falling back to the pseudo-inverse.
///
/// The fallback is taken when Cholesky fails, when its inverse is not
/// finite, or when [`reciprocal_condition`] is at most `INFO_RCOND`.
pub fn invert_information(a: &Array2<f64>) -> InformationInverse {
    let a_nalg = to_dmatrix(a);
    if reciprocal_condition(a) > INFO_RCOND {
        if let Some(chol) = a_nalg.clone().cholesky() {
            let inv = chol.inverse();
            if inv.iter().all(|v| v.is_finite()) {
                return InformationInverse {
                    matrix: to_array2(&inv),
                    pseudo: false,
                    min_eigenvalue: None,
                };
            }
        }
    }
    let eig = SymmetricEigen::new(a_nalg);
    let min_eigenvalue = eig.eigenvalues.iter().copied().fold(f64::INFINITY, f64::min);
    InformationInverse {
        matrix: to_array2(&pseudo_inverse(&eig)),
        pseudo: true,
        min_eigenvalue: Some(min_eigenvalue),
    }
}

// ---- Helper methods ----

fn eigen_cutoff(eigenvalues: &DVector<f64>) -> f64 {
    let max = eigenvalues.iter().fold(0.0_f64, |acc, &l| acc.max(l.abs()));
    EIGEN_EPS * max
}

fn pseudo_inverse(eig: &SymmetricEigen<f64, nalgebra::Dyn>) -> DMatrix<f64> {
    let n = eig.eigenvalues.len();
    let cutoff = eigen_cutoff(&eig.eigenvalues);
    let mut pinv = DMatrix::<f64>::zeros(n, n);
    for (i, &lambda) in eig.eigenvalues.iter().enumerate() {
        if lambda > cutoff {
            let v = eig.eigenvectors.column(i);
            pinv += (v * v.transpose()) / lambda;
        }
    }
    pinv
}

fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    let mut out = DMatrix::<f64>::zeros(a.nrows(), a.ncols());
    fill_dmatrix(a, &mut out);
    out
}

/// Copy a symmetric `ndarray` matrix into a preallocated `DMatrix`, reading
/// the lower triangle and mirroring it column by column.
fn fill_dmatrix(src: &Array2<f64>, dst: &mut DMatrix<f64>) {
    let n = src.ncols();
    for j in 0..n {
        dst[(j, j)] = src[[j, j]];
        for i in (j + 1)..n {
            dst[(i, j)] = src[[i, j]];
            dst[(j, i)] = src[[i, j]];
        }
    }
}

/// `D^{-1/2} A D^{-1/2}` with `D = diag(A)`; zero diagonal entries are left
/// unscaled.
fn unit_diagonal(a: &Array2<f64>) -> Array2<f64> {
    let scale = a.diag().mapv(|v| if v > 0.0 { v.sqrt().recip() } else { 1.0 });
    Array2::from_shape_fn(a.raw_dim(), |(i, j)| a[[i, j]] * scale[i] * scale[j])
}

fn to_array2(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}
