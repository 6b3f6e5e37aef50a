//! The outer Newton loop that ties the problem callbacks, KKT assembler,
//! linear algebra kernel, residual evaluator, and line search together.

use std::fmt;

use faer::Col;

use crate::E;
use crate::config::SolverOptions;
use crate::kkt;
use crate::line_search::{BacktrackingLineSearch, LineSearch};
use crate::linalg::kkt_solver::{DefaultKktSolver, KktSolver, LinAlgError};
use crate::linalg::ops::{col_max, norm2};
use crate::problem::ConvexProgram;
use crate::residual::{eval_r_cent, eval_r_dual, eval_r_pri, surrogate_gap};
use crate::sink::{DiagnosticSink, IterationReport, NoOpSink};
use crate::workspace::Workspace;

/// Errors from [`PrimalDualIpm::start`].
///
/// `derive_more`'s `Display`/`Error` derives (used for [`LinAlgError`])
/// don't fit this type: its `Callback(C)` variant carries the caller's own
/// error type verbatim, and `C` has no trait bounds here — adding ones
/// just to satisfy a derive would force every caller's callback error to
/// implement `Display`/`Error` even when they never inspect `SolveError`
/// as a `std::error::Error`. `Display` and `Error` are implemented by
/// hand below instead, bounded only where the impl actually needs it.
#[derive(Debug)]
pub enum SolveError<C> {
    /// `n == 0`.
    InvalidDimension,
    /// The caller's initial point violates `max f(x) < 0`.
    InfeasibleStart,
    /// The surrogate duality gap went negative: loss of strict
    /// feasibility, a fatal numerical error.
    NumericalDegeneracy,
    /// The KKT linear solve failed.
    LinearAlgebra(LinAlgError),
    /// A caller callback failed; propagated verbatim.
    Callback(C),
}

impl<C: fmt::Display> fmt::Display for SolveError<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimension => write!(f, "n must be greater than zero"),
            Self::InfeasibleStart => write!(f, "initial point is not strictly inequality-feasible"),
            Self::NumericalDegeneracy => write!(f, "surrogate duality gap eta went negative"),
            Self::LinearAlgebra(e) => write!(f, "KKT linear solve failed: {e}"),
            Self::Callback(e) => write!(f, "callback error: {e}"),
        }
    }
}

impl<C: fmt::Debug + fmt::Display> std::error::Error for SolveError<C> {}

/// Final iterate and outcome delivered to [`ConvexProgram::finalize`] and
/// returned from [`PrimalDualIpm::start`] on success.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub x: Col<E>,
    pub lambda: Col<E>,
    pub nu: Col<E>,
    pub converged: bool,
    pub iterations: usize,
}

/// The primal-dual interior-point solver. Generic over the KKT linear
/// solve strategy `K`, the line search strategy `LS`, and the diagnostic
/// sink `S`, so a caller can inject an alternative implementation of any
/// of the three at compile time.
pub struct PrimalDualIpm<K = DefaultKktSolver, LS = BacktrackingLineSearch, S = NoOpSink>
where
    K: KktSolver,
    LS: LineSearch,
    S: DiagnosticSink,
{
    pub options: SolverOptions,
    pub kkt_solver: K,
    pub line_search: LS,
    pub sink: S,
}

impl PrimalDualIpm<DefaultKktSolver, BacktrackingLineSearch, NoOpSink> {
    /// Builds a solver with the default strategies: the runtime-selected
    /// [`DefaultKktSolver`] (honoring `options.decomp`), the two-phase
    /// [`crate::line_search::BacktrackingLineSearch`], and a no-op
    /// diagnostic sink.
    pub fn new(options: SolverOptions) -> Self {
        let kkt_solver = DefaultKktSolver::from_options(&options);
        Self {
            options,
            kkt_solver,
            line_search: BacktrackingLineSearch,
            sink: NoOpSink,
        }
    }
}

impl<K, LS, S> PrimalDualIpm<K, LS, S>
where
    K: KktSolver,
    LS: LineSearch,
    S: DiagnosticSink,
{
    pub fn with_strategies(options: SolverOptions, kkt_solver: K, line_search: LS, sink: S) -> Self {
        Self {
            options,
            kkt_solver,
            line_search,
            sink,
        }
    }

    /// Runs the solver to convergence, non-convergence, or a fatal error.
    ///
    /// `n`/`m`/`p` are read from `problem.n()`/`problem.m()`/`problem.p()`.
    /// On any error — including a callback error — `finalize` is never
    /// called. On non-convergence, `finalize` is still called with
    /// `converged = false` and the best iterate found, and `Ok` is
    /// returned: non-convergence is a result, not an error.
    pub fn start<P: ConvexProgram>(&mut self, problem: &mut P) -> Result<Outcome, SolveError<P::Error>> {
        let n = problem.n();
        let m = problem.m();
        let p = problem.p();

        if n == 0 {
            return Err(SolveError::InvalidDimension);
        }

        let mut ws = Workspace::new(n, m, p);

        // ---- initial point, lambda, nu, (A, b). ----
        let x0 = problem.initial_point().map_err(SolveError::Callback)?;
        ws.x.copy_from(x0.as_ref());
        for i in 0..m {
            ws.lambda[i] = self.options.margin;
        }
        // nu already zero from Workspace::new.

        let (equality_mat, equality_rhs) = problem.equality().map_err(SolveError::Callback)?;

        // ---- initial Df_o, f, Df, feasibility check. ----
        let grad0 = problem.objective_grad(&ws.x).map_err(SolveError::Callback)?;
        ws.objective_grad.copy_from(grad0.as_ref());
        if m > 0 {
            let f0 = problem.inequality(&ws.x).map_err(SolveError::Callback)?;
            ws.inequality_val.copy_from(f0.as_ref());
            let jac0 = problem.inequality_grad(&ws.x).map_err(SolveError::Callback)?;
            ws.inequality_jac.copy_from(jac0.as_ref());

            if col_max(ws.inequality_val.as_ref()) >= 0.0 {
                return Err(SolveError::InfeasibleStart);
            }
        }

        // ---- initial r_dual, r_pri (r_cent awaits t). ----
        eval_r_dual(
            ws.objective_grad.as_ref(),
            ws.inequality_jac.as_ref(),
            ws.lambda.as_ref(),
            equality_mat.as_ref(),
            ws.nu.as_ref(),
            &mut ws.r_t.r_dual,
        );
        if p > 0 {
            eval_r_pri(
                equality_mat.as_ref(),
                ws.x.as_ref(),
                equality_rhs.as_ref(),
                &mut ws.r_t.r_pri,
            );
        }

        let mut converged = false;
        let mut iterations = 0usize;
        let mut last_step = 0.0_f64;

        // ---- outer Newton loop. ----
        for iter in 0..self.options.loop_budget {
            iterations = iter + 1;

            let eta = if m > 0 {
                surrogate_gap(ws.inequality_val.as_ref(), ws.lambda.as_ref())
            } else {
                self.options.eps
            };
            if eta < 0.0 {
                return Err(SolveError::NumericalDegeneracy);
            }
            let inv_t = if m > 0 {
                eta / (self.options.mu * m as E)
            } else {
                0.0
            };

            if m > 0 {
                eval_r_cent(
                    ws.inequality_val.as_ref(),
                    ws.lambda.as_ref(),
                    inv_t,
                    &mut ws.r_t.r_cent,
                );
            }

            let r_dual_norm = norm2(ws.r_t.r_dual.as_ref());
            let r_pri_norm = norm2(ws.r_t.r_pri.as_ref());

            self.sink.report(IterationReport {
                iter,
                r_dual_norm,
                r_pri_norm,
                eta,
                step: last_step,
            });

            if r_dual_norm <= self.options.eps_feas
                && r_pri_norm <= self.options.eps_feas
                && eta <= self.options.eps
            {
                converged = true;
                break;
            }

            // ---- assemble KKT. ----
            let obj_hess = problem.objective_hess(&ws.x).map_err(SolveError::Callback)?;
            ws.objective_hess.copy_from(obj_hess.as_ref());

            let mut ineq_hess = Vec::with_capacity(m);
            for i in 0..m {
                let hi = problem
                    .inequality_hess(&ws.x, i)
                    .map_err(SolveError::Callback)?;
                ineq_hess.push(hi);
            }

            kkt::assemble(
                n,
                m,
                p,
                ws.objective_hess.as_ref(),
                ineq_hess.iter().map(|h| h.as_ref()),
                ws.lambda.as_ref(),
                ws.inequality_jac.as_ref(),
                ws.inequality_val.as_ref(),
                equality_mat.as_ref(),
                &mut ws.kkt,
            );

            // ---- solve KKT * dy = -r_t. ----
            let mut rhs = Col::<E>::zeros(n + m + p);
            for i in 0..n {
                rhs[i] = -ws.r_t.r_dual[i];
            }
            for i in 0..m {
                rhs[n + i] = -ws.r_t.r_cent[i];
            }
            for i in 0..p {
                rhs[n + m + i] = -ws.r_t.r_pri[i];
            }

            let dy = self
                .kkt_solver
                .solve(ws.kkt.as_ref(), &rhs)
                .map_err(SolveError::LinearAlgebra)?;
            ws.unpack_dy(&dy);

            // ---- line search. ----
            let outcome = self
                .line_search
                .search(
                    problem,
                    &self.options,
                    (equality_mat.as_ref(), equality_rhs.as_ref()),
                    inv_t,
                    &mut ws,
                )
                .map_err(SolveError::Callback)?;

            match outcome {
                Some(ls) => last_step = ls.step,
                None => {
                    converged = false;
                    break;
                }
            }
        }

        self.sink.finish(converged, iterations);

        problem
            .finalize(&ws.x, &ws.lambda, &ws.nu, converged)
            .map_err(SolveError::Callback)?;

        Ok(Outcome {
            x: ws.x,
            lambda: ws.lambda,
            nu: ws.nu,
            converged,
            iterations,
        })
    }
}
