//! Solver configuration: every tunable fixed before `start` and held
//! constant for the whole solve.

use crate::E;

/// Strategy used to solve the (possibly indefinite, possibly
/// rank-deficient) KKT linear system each iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Decomposition {
    /// Rank-revealing, SVD-based solve. Tolerates indefiniteness and rank
    /// deficiency at degenerate iterates. The robust default.
    #[default]
    Svd,
    /// Partial-pivot LU solve. Faster, but fails outright on a singular
    /// (to working precision) KKT matrix.
    Lu,
}

/// Configuration for [`crate::solver::PrimalDualIpm`]. All fields are set
/// before `start` and fixed for the whole solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverOptions {
    /// Initial value for every component of lambda. Default 1.0.
    pub margin: E,
    /// Maximum outer iterations. Default 256.
    pub loop_budget: usize,
    /// Combined budget for line-search phases B+C. Default 256.
    pub b_loop: usize,
    /// Residual-norm tolerance for `r_dual` and `r_pri`. Default
    /// `sqrt(f64::EPSILON)`.
    pub eps_feas: E,
    /// Tolerance for the surrogate gap eta. Default `sqrt(f64::EPSILON)`.
    pub eps: E,
    /// Centering parameter; larger means faster gap decrease and less
    /// centering. Default 10.0.
    pub mu: E,
    /// Armijo sufficient-decrease constant, in (0, 1/2). Default 0.1.
    pub alpha: E,
    /// Line-search contraction factor, in (0, 1). Default 0.8.
    pub beta: E,
    /// Fraction-to-boundary safety factor, in (0, 1). Default 0.99.
    pub s_coef: E,
    /// Factorization used for the KKT solve. Default [`Decomposition::Svd`].
    pub decomp: Decomposition,
}

impl Default for SolverOptions {
    fn default() -> Self {
        let eps_scalar = E::EPSILON.sqrt();
        Self {
            margin: 1.0,
            loop_budget: 256,
            b_loop: 256,
            eps_feas: eps_scalar,
            eps: eps_scalar,
            mu: 10.0,
            alpha: 0.1,
            beta: 0.8,
            s_coef: 0.99,
            decomp: Decomposition::default(),
        }
    }
}

impl SolverOptions {
    /// `sqrt(machine epsilon)`, used as the numerical-epsilon floor for
    /// eta when m = 0 and as the minimum-progress threshold in the line
    /// search.
    pub fn eps_scalar() -> E {
        E::EPSILON.sqrt()
    }
}
