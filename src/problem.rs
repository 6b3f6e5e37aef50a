//! The caller-supplied callback set for a convex program
//!
//! ```text
//! minimize     f0(x)
//! subject to   fi(x) <= 0,  i = 1..m
//!              A x = b
//! ```
//!
//! expressed as a trait rather than bare function pointers, so a caller's
//! callback can fail with its own error type and that error is propagated
//! verbatim by the solver.

use faer::{Col, Mat};

use crate::E;

/// Caller-supplied objective, constraints, and initial point for a single
/// solve. Implementors own whatever closures, captured data, or external
/// state their `f0`/`fi`/`A` require.
///
/// If `m() == 0` the inequality callbacks ([`inequality`](Self::inequality),
/// [`inequality_grad`](Self::inequality_grad),
/// [`inequality_hess`](Self::inequality_hess)) are never invoked by the
/// solver. If `p() == 0`, [`equality`](Self::equality) must still return
/// zero-row data.
pub trait ConvexProgram {
    /// The error a callback may fail with. Propagated verbatim by
    /// [`crate::solver::PrimalDualIpm::start`] — never wrapped or erased.
    type Error;

    /// Number of decision variables, n > 0.
    fn n(&self) -> usize;
    /// Number of inequality constraints, m >= 0.
    fn m(&self) -> usize;
    /// Number of equality constraints, p >= 0.
    fn p(&self) -> usize;

    /// Writes a strictly inequality-feasible starting point, `fi(x0) < 0`
    /// for every i.
    fn initial_point(&self) -> Result<Col<E>, Self::Error>;

    /// `g <- grad f0(x)`, length n.
    fn objective_grad(&self, x: &Col<E>) -> Result<Col<E>, Self::Error>;

    /// `H <- grad^2 f0(x)`, n x n symmetric PSD.
    fn objective_hess(&self, x: &Col<E>) -> Result<Mat<E>, Self::Error>;

    /// `f <- (f1(x), .., fm(x))`. Not called when m = 0.
    fn inequality(&self, x: &Col<E>) -> Result<Col<E>, Self::Error>;

    /// `J <- grad f(x)`, the m x n Jacobian whose i-th row is `grad
    /// fi(x)^T`. Not called when m = 0.
    fn inequality_grad(&self, x: &Col<E>) -> Result<Mat<E>, Self::Error>;

    /// `H <- grad^2 fi(x)`, n x n. Not called when m = 0.
    fn inequality_hess(&self, x: &Col<E>, i: usize) -> Result<Mat<E>, Self::Error>;

    /// `(A, b)` of the linear equality constraints, p x n and length p.
    /// Called once per solve. Must return zero-row data when p = 0.
    fn equality(&self) -> Result<(Mat<E>, Col<E>), Self::Error>;

    /// Notification hook called once at the end of `start`, regardless of
    /// outcome, with the final iterate and whether it converged. Any error
    /// returned here aborts `start` with that error.
    fn finalize(
        &mut self,
        x: &Col<E>,
        lambda: &Col<E>,
        nu: &Col<E>,
        converged: bool,
    ) -> Result<(), Self::Error>;
}
