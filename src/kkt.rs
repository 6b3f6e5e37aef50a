//! Builds the dense `(n+m+p)^2` block KKT matrix
//!
//! ```text
//!      |  H_x           Df^T        A^T |
//!      | -diag(l) Df   -diag(f)      0  |
//!      |  A              0           0  |
//! ```
//!
//! with `H_x = grad^2 f0(x) + sum_i lambda_i grad^2 fi(x)`.
//!
//! Built as dense writes into a zero-initialized matrix each iteration;
//! the matrix is never accumulated across iterations.

use faer::{ColRef, Mat, MatRef};

use crate::E;

/// Builds the KKT matrix from the current iterate's Hessian contributions,
/// constraint Jacobian, and constraint values into `out`, overwriting every
/// entry (the six named blocks explicitly, everything else zeroed). `out`
/// must already be `(n+m+p) x (n+m+p)`; it is never resized, so the caller's
/// buffer is reused every iteration instead of reallocating.
///
/// `objective_hess` is `n x n`. `inequality_hess` must yield exactly `m`
/// matrices, each `n x n` (the i-th is `grad^2 fi(x)`); `inequality_hess`
/// is not invoked (and its values are irrelevant) when `m == 0`.
/// `inequality_jac` is `m x n`, `inequality_val` has length `m`.
/// `equality_mat` is `p x n`.
#[allow(clippy::too_many_arguments)]
pub fn assemble<'a>(
    n: usize,
    m: usize,
    p: usize,
    objective_hess: MatRef<'_, E>,
    inequality_hess: impl Iterator<Item = MatRef<'a, E>>,
    lambda: ColRef<'_, E>,
    inequality_jac: MatRef<'_, E>,
    inequality_val: ColRef<'_, E>,
    equality_mat: MatRef<'_, E>,
    out: &mut Mat<E>,
) {
    let size = n + m + p;
    let kkt = out;
    for i in 0..size {
        for j in 0..size {
            kkt[(i, j)] = 0.0;
        }
    }

    // H_x = objective_hess + sum_i lambda_i * inequality_hess_i.
    for i in 0..n {
        for j in 0..n {
            kkt[(i, j)] = objective_hess[(i, j)];
        }
    }
    for (i, hi) in inequality_hess.enumerate().take(m) {
        let li = lambda[i];
        for r in 0..n {
            for c in 0..n {
                kkt[(r, c)] += li * hi[(r, c)];
            }
        }
    }

    if m > 0 {
        // Df^T into the top-middle block, -diag(lambda) Df into the
        // middle-left block, -diag(f) into the middle-middle block.
        for i in 0..m {
            let li = lambda[i];
            let fi = inequality_val[i];
            kkt[(n + i, n + i)] = -fi;
            for j in 0..n {
                let jac_ij = inequality_jac[(i, j)];
                kkt[(j, n + i)] = jac_ij;
                kkt[(n + i, j)] = -li * jac_ij;
            }
        }
    }

    if p > 0 {
        for i in 0..p {
            for j in 0..n {
                let a_ij = equality_mat[(i, j)];
                kkt[(j, n + m + i)] = a_ij;
                kkt[(n + m + i, j)] = a_ij;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faer::{Col, mat};

    #[test]
    fn assembles_equality_only_block() {
        // n=2, m=0, p=1: only H_x (top-left) and A/A^T should be nonzero.
        let h = mat![[2.0, 0.0], [0.0, 2.0]];
        let a = mat![[1.0, 1.0]];
        let lambda = Col::<E>::zeros(0);
        let jac = Mat::<E>::zeros(0, 2);
        let f = Col::<E>::zeros(0);

        let mut kkt = Mat::<E>::zeros(3, 3);
        assemble(
            2,
            0,
            1,
            h.as_ref(),
            std::iter::empty(),
            lambda.as_ref(),
            jac.as_ref(),
            f.as_ref(),
            a.as_ref(),
            &mut kkt,
        );

        assert_eq!(kkt.nrows(), 3);
        assert_eq!(kkt[(0, 0)], 2.0);
        assert_eq!(kkt[(1, 1)], 2.0);
        assert_eq!(kkt[(0, 2)], 1.0);
        assert_eq!(kkt[(2, 0)], 1.0);
        assert_eq!(kkt[(1, 2)], 1.0);
        assert_eq!(kkt[(2, 1)], 1.0);
    }

    #[test]
    fn assembles_inequality_only_block() {
        // n=1, m=1, p=0.
        let h = mat![[0.0]];
        let hi = mat![[0.0]];
        let jac = mat![[1.0]]; // d/dx (x - 1) = 1
        let f = Col::from_fn(1, |_| -0.5_f64); // x = 0.5, f = x - 1
        let lambda = Col::from_fn(1, |_| 2.0_f64);
        let a = Mat::<E>::zeros(0, 1);

        let mut kkt = Mat::<E>::zeros(2, 2);
        assemble(
            1,
            1,
            0,
            h.as_ref(),
            std::iter::once(hi.as_ref()),
            lambda.as_ref(),
            jac.as_ref(),
            f.as_ref(),
            a.as_ref(),
            &mut kkt,
        );

        assert_eq!(kkt.nrows(), 2);
        assert_eq!(kkt[(0, 1)], 1.0); // Df^T
        assert_eq!(kkt[(1, 0)], -2.0 * 1.0); // -lambda * Df
        assert_eq!(kkt[(1, 1)], 0.5); // -f
    }
}
