//! The perturbed-KKT residuals and the surrogate duality gap eta.
//!
//! ```text
//! r_dual = grad f0(x) + Df(x)^T lambda + A^T nu     (length n)
//! r_cent = -lambda (*) f(x) - inv_t * 1             (length m, omitted if m = 0)
//! r_pri  = A x - b                                  (length p, omitted if p = 0)
//! ```

use faer::{Col, ColRef, MatRef};

use crate::E;
use crate::linalg::ops::{dot, gemv};

/// The stacked residual `r_t = [r_dual; r_cent; r_pri]`, held as three
/// separately-sized vectors rather than one aliased slice: nothing
/// downstream needs `r_t` as a single contiguous buffer, so the fields
/// stay independently resizable.
#[derive(Debug, Clone)]
pub struct Residual {
    pub r_dual: Col<E>,
    pub r_cent: Col<E>,
    pub r_pri: Col<E>,
}

impl Residual {
    pub fn zeros(n: usize, m: usize, p: usize) -> Self {
        Self {
            r_dual: Col::zeros(n),
            r_cent: Col::zeros(m),
            r_pri: Col::zeros(p),
        }
    }

    /// `sqrt(||r_dual||^2 + ||r_cent||^2 + ||r_pri||^2)`, i.e. the norm of
    /// the logical concatenation `r_t`, without materializing it.
    pub fn norm(&self) -> E {
        (dot(self.r_dual.as_ref(), self.r_dual.as_ref())
            + dot(self.r_cent.as_ref(), self.r_cent.as_ref())
            + dot(self.r_pri.as_ref(), self.r_pri.as_ref()))
        .sqrt()
    }
}

/// Surrogate duality gap `eta = -f(x)^T lambda` when `m > 0`. The `m = 0`
/// fallback (defaulting eta to the configured tolerance, short-circuiting
/// the centrality test) is the caller's responsibility: this function only
/// computes the `m > 0` branch since it has no access to that tolerance
/// (see [`crate::solver::PrimalDualIpm`]).
pub fn surrogate_gap(f: ColRef<'_, E>, lambda: ColRef<'_, E>) -> E {
    -dot(f, lambda)
}

/// Fills `r_dual <- grad_f0 + Df^T lambda + A^T nu`. `jac` is the m x n
/// inequality Jacobian (ignored, and may be 0 x n, when `m == 0`); `a` is
/// the p x n equality matrix (ignored, and may be 0 x n, when `p == 0`).
pub fn eval_r_dual(
    objective_grad: ColRef<'_, E>,
    jac: MatRef<'_, E>,
    lambda: ColRef<'_, E>,
    a: MatRef<'_, E>,
    nu: ColRef<'_, E>,
    out: &mut Col<E>,
) {
    out.copy_from(objective_grad);
    if lambda.nrows() > 0 {
        gemv(1.0, jac.transpose(), lambda, 1.0, out);
    }
    if nu.nrows() > 0 {
        gemv(1.0, a.transpose(), nu, 1.0, out);
    }
}

/// Fills `r_cent <- -lambda (*) f - inv_t * 1`. Leaves `out` untouched
/// (zero-length) when `m == 0`.
pub fn eval_r_cent(f: ColRef<'_, E>, lambda: ColRef<'_, E>, inv_t: E, out: &mut Col<E>) {
    for i in 0..out.nrows() {
        out[i] = -lambda[i] * f[i] - inv_t;
    }
}

/// Fills `r_pri <- A x - b`. Leaves `out` untouched (zero-length) when `p
/// == 0`.
pub fn eval_r_pri(a: MatRef<'_, E>, x: ColRef<'_, E>, b: ColRef<'_, E>, out: &mut Col<E>) {
    gemv(1.0, a, x, 0.0, out);
    for i in 0..out.nrows() {
        out[i] -= b[i];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::mat;

    #[test]
    fn surrogate_gap_matches_definition() {
        let f = Col::from_fn(2, |i| [-1.0, -2.0][i]);
        let lambda = Col::from_fn(2, |i| [3.0, 4.0][i]);
        // eta = -(-1*3 + -2*4) = -(-11) = 11
        assert_eq!(surrogate_gap(f.as_ref(), lambda.as_ref()), 11.0);
    }

    #[test]
    fn r_pri_is_ax_minus_b() {
        let a = mat![[1.0, 1.0]];
        let x = Col::from_fn(2, |i| [0.3, 0.7][i]);
        let b = Col::from_fn(1, |_| 1.0_f64);
        let mut out = Col::<E>::zeros(1);
        eval_r_pri(a.as_ref(), x.as_ref(), b.as_ref(), &mut out);
        assert!((out[0] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn r_dual_accumulates_all_three_terms() {
        let grad = Col::from_fn(2, |i| [1.0, 1.0][i]);
        let jac = mat![[1.0, 0.0], [0.0, 1.0]];
        let lambda = Col::from_fn(2, |i| [2.0, 3.0][i]);
        let a = mat![[1.0, 1.0]];
        let nu = Col::from_fn(1, |_| 5.0_f64);
        let mut out = Col::<E>::zeros(2);
        eval_r_dual(
            grad.as_ref(),
            jac.as_ref(),
            lambda.as_ref(),
            a.as_ref(),
            nu.as_ref(),
            &mut out,
        );
        // grad + I^T*lambda + ones^T*nu = (1+2+5, 1+3+5)
        assert_eq!(out[0], 8.0);
        assert_eq!(out[1], 9.0);
    }

    #[test]
    fn empty_residual_norm_is_zero() {
        let r = Residual::zeros(2, 0, 0);
        assert_eq!(r.norm(), 0.0);
    }
}
