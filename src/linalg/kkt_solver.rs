//! Pluggable KKT linear solve: a single dense `solve` call rather than a
//! cached analyze/factorize/solve split, since the KKT matrix is rebuilt
//! from scratch every iteration and never accumulated, so there is no
//! symbolic structure worth amortizing across calls.
//!
//! `SvdKktSolver` is the default, robust-to-indefinite-and-rank-deficient
//! strategy. `LuKktSolver` is the faster, fragile alternative, selected
//! at runtime via [`crate::config::Decomposition`].

use derive_more::{Display, Error};
use faer::{Col, Mat, MatRef};

use crate::E;
use crate::config::{Decomposition, SolverOptions};

/// Errors from the KKT linear solve.
#[derive(Debug, Display, Error, PartialEq)]
pub enum LinAlgError {
    #[display("KKT matrix is not square (expected {expected} x {expected}, got {rows} x {cols})")]
    DimensionMismatch {
        expected: usize,
        rows: usize,
        cols: usize,
    },
    #[display("KKT solve failed: matrix has no usable rank")]
    RankDeficient,
    #[display("LU factorization failed: matrix is numerically singular")]
    SingularMatrix,
    #[display("SVD decomposition did not converge")]
    SvdDidNotConverge,
}

/// Strategy for solving `KKT * dy = rhs` for the Newton step `dy`.
pub trait KktSolver {
    /// Solves `kkt * dy = rhs` for `dy`. Implementations must not assume
    /// `kkt` is symmetric, positive definite, or full rank.
    fn solve(&mut self, kkt: MatRef<'_, E>, rhs: &Col<E>) -> Result<Col<E>, LinAlgError>;
}

/// Threshold below which a singular value is treated as numerically zero
/// relative to the largest one, following the usual rank-revealing
/// convention `tol = max(n, m) * eps * sigma_max`.
fn rank_tolerance(n: usize, m: usize, sigma_max: E) -> E {
    (n.max(m) as E) * E::EPSILON * sigma_max
}

/// Rank-revealing, SVD-based KKT solve. Tolerant of the indefinite,
/// possibly rank-deficient matrices the assembler produces at degenerate
/// iterates. The safe default.
#[derive(Debug, Default, Clone, Copy)]
pub struct SvdKktSolver;

impl KktSolver for SvdKktSolver {
    fn solve(&mut self, kkt: MatRef<'_, E>, rhs: &Col<E>) -> Result<Col<E>, LinAlgError> {
        let n = kkt.nrows();
        if kkt.ncols() != n || rhs.nrows() != n {
            return Err(LinAlgError::DimensionMismatch {
                expected: n,
                rows: kkt.nrows(),
                cols: kkt.ncols(),
            });
        }

        let svd = kkt.svd().map_err(|_| LinAlgError::SvdDidNotConverge)?;
        let u = svd.U();
        let v = svd.V();
        let s = svd.S().column_vector();

        let sigma_max = (0..s.nrows()).map(|i| s[i]).fold(0.0_f64, E::max);
        if sigma_max == 0.0 {
            return Err(LinAlgError::RankDeficient);
        }
        let tol = rank_tolerance(n, n, sigma_max);

        // x = V * diag(1/sigma_i, or 0 below tol) * U^T * rhs
        let utb = u.transpose() * rhs;
        let mut scaled = Col::<E>::zeros(s.nrows());
        let mut rank = 0usize;
        for i in 0..s.nrows() {
            if s[i] > tol {
                scaled[i] = utb[i] / s[i];
                rank += 1;
            } else {
                scaled[i] = 0.0;
            }
        }
        if rank == 0 {
            return Err(LinAlgError::RankDeficient);
        }

        Ok(v * &scaled)
    }
}

/// Partial-pivot LU KKT solve. Faster than [`SvdKktSolver`] but fails
/// outright on a numerically singular matrix rather than degrading
/// gracefully.
#[derive(Debug, Default, Clone, Copy)]
pub struct LuKktSolver;

impl KktSolver for LuKktSolver {
    fn solve(&mut self, kkt: MatRef<'_, E>, rhs: &Col<E>) -> Result<Col<E>, LinAlgError> {
        let n = kkt.nrows();
        if kkt.ncols() != n || rhs.nrows() != n {
            return Err(LinAlgError::DimensionMismatch {
                expected: n,
                rows: kkt.nrows(),
                cols: kkt.ncols(),
            });
        }

        let lu = kkt.partial_piv_lu();
        let rhs_mat = Mat::from_fn(n, 1, |i, _| rhs[i]);
        let sol = lu.solve(&rhs_mat);

        let mut out = Col::<E>::zeros(n);
        for i in 0..n {
            let v = sol[(i, 0)];
            if !v.is_finite() {
                return Err(LinAlgError::SingularMatrix);
            }
            out[i] = v;
        }
        Ok(out)
    }
}

/// Runtime-selected KKT solve strategy: the choice between an SVD-like
/// rank-revealing solver and a faster but fragile LU factorization should
/// be picked at runtime rather than fixed at compile time. Where
/// [`SvdKktSolver`] and [`LuKktSolver`] let a caller inject a fixed
/// strategy at compile time (as [`crate::solver::PrimalDualIpm`]'s generic
/// `K` parameter allows), `DefaultKktSolver` switches between them
/// according to [`SolverOptions::decomp`], read once at construction.
#[derive(Debug, Clone, Copy)]
pub enum DefaultKktSolver {
    Svd(SvdKktSolver),
    Lu(LuKktSolver),
}

impl DefaultKktSolver {
    pub fn from_options(options: &SolverOptions) -> Self {
        match options.decomp {
            Decomposition::Svd => Self::Svd(SvdKktSolver),
            Decomposition::Lu => Self::Lu(LuKktSolver),
        }
    }
}

impl Default for DefaultKktSolver {
    fn default() -> Self {
        Self::Svd(SvdKktSolver)
    }
}

impl KktSolver for DefaultKktSolver {
    fn solve(&mut self, kkt: MatRef<'_, E>, rhs: &Col<E>) -> Result<Col<E>, LinAlgError> {
        match self {
            Self::Svd(s) => s.solve(kkt, rhs),
            Self::Lu(s) => s.solve(kkt, rhs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn default_kkt_solver_honors_decomp_option() {
        let mut opts = SolverOptions::default();
        opts.decomp = Decomposition::Lu;
        let mut solver = DefaultKktSolver::from_options(&opts);
        assert!(matches!(solver, DefaultKktSolver::Lu(_)));

        let a = mat![[4.0, 1.0], [1.0, 3.0]];
        let b = Col::from_fn(2, |i| [1.0, 2.0][i]);
        let x = solver.solve(a.as_ref(), &b).unwrap();
        let residual = &a * &x - &b;
        assert!(crate::linalg::ops::norm2(residual.as_ref()) < 1e-8);
    }

    #[test]
    fn svd_solves_spd_system() {
        let a = mat![[4.0, 1.0], [1.0, 3.0]];
        let b = Col::from_fn(2, |i| [1.0, 2.0][i]);
        let mut solver = SvdKktSolver;
        let x = solver.solve(a.as_ref(), &b).unwrap();
        let residual = &a * &x - &b;
        assert!(crate::linalg::ops::norm2(residual.as_ref()) < 1e-8);
    }

    #[test]
    fn lu_solves_spd_system() {
        let a = mat![[4.0, 1.0], [1.0, 3.0]];
        let b = Col::from_fn(2, |i| [1.0, 2.0][i]);
        let mut solver = LuKktSolver;
        let x = solver.solve(a.as_ref(), &b).unwrap();
        let residual = &a * &x - &b;
        assert!(crate::linalg::ops::norm2(residual.as_ref()) < 1e-8);
    }

    #[test]
    fn svd_tolerates_rank_deficiency() {
        // Rank-1 matrix: rows are multiples of each other.
        let a = mat![[1.0, 2.0], [2.0, 4.0]];
        let b = Col::from_fn(2, |i| [1.0, 2.0][i]);
        let mut solver = SvdKktSolver;
        // Must not panic or hard-fail; a least-norm solution exists since
        // b lies in the column space of a.
        let x = solver.solve(a.as_ref(), &b);
        assert!(x.is_ok());
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let a = mat![[1.0, 0.0], [0.0, 1.0]];
        let b = Col::<E>::zeros(3);
        let mut solver = SvdKktSolver;
        assert!(matches!(
            solver.solve(a.as_ref(), &b),
            Err(LinAlgError::DimensionMismatch { .. })
        ));
    }
}
