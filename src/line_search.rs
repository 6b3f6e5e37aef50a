//! Two-phase backtracking line search: fraction-to-boundary for lambda,
//! then a strict-feasibility phase and a residual-descent phase that
//! share one trial-evaluation budget rather than each getting their own.

use faer::{Col, ColRef, MatRef};

use crate::E;
use crate::config::SolverOptions;
use crate::linalg::ops::{col_max, is_col_positive};
use crate::problem::ConvexProgram;
use crate::residual::{eval_r_cent, eval_r_dual, eval_r_pri};
use crate::workspace::Workspace;

/// Result of a committed line search.
#[derive(Debug, Clone, Copy)]
pub struct LineSearchOutcome {
    /// The accepted step length `s`.
    pub step: E,
    /// Number of trial evaluations consumed (shared Phase B + Phase C
    /// budget).
    pub trials: usize,
}

/// Strategy for the per-iteration line search. `search` mutates `ws` in
/// place: on acceptance, `x`/`lambda`/`nu` and the cached
/// objective-gradient/inequality-value/inequality-Jacobian/residual fields
/// are all advanced to the trial iterate; on rejection, `ws` is left
/// exactly as it was passed in (the driver then terminates with
/// `converged = false`).
pub trait LineSearch {
    fn search<P: ConvexProgram>(
        &self,
        problem: &P,
        options: &SolverOptions,
        equality: (MatRef<'_, E>, ColRef<'_, E>),
        inv_t: E,
        ws: &mut Workspace,
    ) -> Result<Option<LineSearchOutcome>, P::Error>;
}

/// `ε_min`, the Phase A zero-division guard: the smallest positive normal
/// magnitude, not an algorithmic parameter. Not exposed through
/// [`SolverOptions`].
const EPS_MIN: E = E::MIN_POSITIVE;

fn step_into(x: ColRef<'_, E>, dx: ColRef<'_, E>, s: E, out: &mut Col<E>) {
    for i in 0..out.nrows() {
        out[i] = x[i] + s * dx[i];
    }
}

fn diff_norm(
    x: ColRef<'_, E>,
    lambda: ColRef<'_, E>,
    nu: ColRef<'_, E>,
    x2: ColRef<'_, E>,
    lambda2: ColRef<'_, E>,
    nu2: ColRef<'_, E>,
) -> E {
    let mut acc = 0.0;
    for i in 0..x.nrows() {
        let d = x2[i] - x[i];
        acc += d * d;
    }
    for i in 0..lambda.nrows() {
        let d = lambda2[i] - lambda[i];
        acc += d * d;
    }
    for i in 0..nu.nrows() {
        let d = nu2[i] - nu[i];
        acc += d * d;
    }
    acc.sqrt()
}

/// The two-phase backtracking search: fraction-to-boundary for lambda
/// (Phase A), strict feasibility (Phase B), then residual descent
/// (Phase C), Phase B and C sharing one `b_loop` trial budget.
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktrackingLineSearch;

impl LineSearch for BacktrackingLineSearch {
    fn search<P: ConvexProgram>(
        &self,
        problem: &P,
        options: &SolverOptions,
        equality: (MatRef<'_, E>, ColRef<'_, E>),
        inv_t: E,
        ws: &mut Workspace,
    ) -> Result<Option<LineSearchOutcome>, P::Error> {
        let (a, b) = equality;
        let m = ws.m;

        // Phase A: fraction-to-boundary for lambda.
        let mut s_max = 1.0_f64;
        for i in 0..m {
            let dl = ws.dlambda[i];
            if dl < -EPS_MIN {
                s_max = s_max.min(-ws.lambda[i] / dl);
            }
        }
        let mut s = options.s_coef * s_max;

        step_into(ws.x.as_ref(), ws.dx.as_ref(), s, &mut ws.x_trial);
        step_into(
            ws.lambda.as_ref(),
            ws.dlambda.as_ref(),
            s,
            &mut ws.lambda_trial,
        );
        step_into(ws.nu.as_ref(), ws.dnu.as_ref(), s, &mut ws.nu_trial);

        // Phase B: strict feasibility.
        let mut trials = 0usize;
        while trials < options.b_loop {
            if m > 0 {
                let f_trial = problem.inequality(&ws.x_trial)?;
                ws.inequality_val_trial.copy_from(f_trial.as_ref());
            }
            let feasible = (m == 0 || col_max(ws.inequality_val_trial.as_ref()) < 0.0)
                && (m == 0 || is_col_positive(ws.lambda_trial.as_ref()));
            if feasible {
                break;
            }
            trials += 1;
            s *= options.beta;
            step_into(ws.x.as_ref(), ws.dx.as_ref(), s, &mut ws.x_trial);
            step_into(
                ws.lambda.as_ref(),
                ws.dlambda.as_ref(),
                s,
                &mut ws.lambda_trial,
            );
            step_into(ws.nu.as_ref(), ws.dnu.as_ref(), s, &mut ws.nu_trial);
        }

        // Phase C: residual descent, frozen baseline norm from before the
        // step, sharing the remaining `b_loop` budget with Phase B.
        let baseline_norm = ws.r_t.norm();
        while trials < options.b_loop {
            let grad_trial = problem.objective_grad(&ws.x_trial)?;
            ws.objective_grad_trial.copy_from(grad_trial.as_ref());

            if m > 0 {
                let f_trial = problem.inequality(&ws.x_trial)?;
                ws.inequality_val_trial.copy_from(f_trial.as_ref());
                let jac_trial = problem.inequality_grad(&ws.x_trial)?;
                ws.inequality_jac_trial.copy_from(jac_trial.as_ref());
            }

            eval_r_dual(
                ws.objective_grad_trial.as_ref(),
                ws.inequality_jac_trial.as_ref(),
                ws.lambda_trial.as_ref(),
                a,
                ws.nu_trial.as_ref(),
                &mut ws.r_t_trial.r_dual,
            );
            if m > 0 {
                eval_r_cent(
                    ws.inequality_val_trial.as_ref(),
                    ws.lambda_trial.as_ref(),
                    inv_t,
                    &mut ws.r_t_trial.r_cent,
                );
            }
            if ws.p > 0 {
                eval_r_pri(a, ws.x_trial.as_ref(), b, &mut ws.r_t_trial.r_pri);
            }

            if ws.r_t_trial.norm() <= (1.0 - options.alpha * s) * baseline_norm {
                break;
            }
            trials += 1;
            s *= options.beta;
            step_into(ws.x.as_ref(), ws.dx.as_ref(), s, &mut ws.x_trial);
            step_into(
                ws.lambda.as_ref(),
                ws.dlambda.as_ref(),
                s,
                &mut ws.lambda_trial,
            );
            step_into(ws.nu.as_ref(), ws.dnu.as_ref(), s, &mut ws.nu_trial);
        }

        let progressed = diff_norm(
            ws.x.as_ref(),
            ws.lambda.as_ref(),
            ws.nu.as_ref(),
            ws.x_trial.as_ref(),
            ws.lambda_trial.as_ref(),
            ws.nu_trial.as_ref(),
        ) >= SolverOptions::eps_scalar();

        if trials < options.b_loop && progressed {
            ws.x.copy_from(ws.x_trial.as_ref());
            ws.lambda.copy_from(ws.lambda_trial.as_ref());
            ws.nu.copy_from(ws.nu_trial.as_ref());
            ws.objective_grad.copy_from(ws.objective_grad_trial.as_ref());
            if m > 0 {
                ws.inequality_val.copy_from(ws.inequality_val_trial.as_ref());
                ws.inequality_jac.copy_from(ws.inequality_jac_trial.as_ref());
            }
            ws.r_t.r_dual.copy_from(ws.r_t_trial.r_dual.as_ref());
            if ws.p > 0 {
                ws.r_t.r_pri.copy_from(ws.r_t_trial.r_pri.as_ref());
            }
            Ok(Some(LineSearchOutcome { step: s, trials }))
        } else {
            Ok(None)
        }
    }
}
