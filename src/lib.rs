//! Primal-dual interior-point method (PDIPM) core.
//!
//! Solves constrained convex programs of the form
//!
//! ```text
//! minimize     f0(x)
//! subject to   fi(x) <= 0,  i = 1..m
//!              A x = b
//! ```
//!
//! by Newton-stepping the perturbed KKT conditions, centered by a surrogate
//! duality gap and kept feasible by a two-phase backtracking line search.
//! The objective/constraint callbacks, the dense linear algebra back end,
//! and any CLI/logging surface are external collaborators supplied by the
//! caller; see [`problem::ConvexProgram`] and [`linalg::kkt_solver::KktSolver`].

pub type E = f64;

pub mod config;
pub mod kkt;
pub mod line_search;
pub mod linalg;
pub mod problem;
pub mod residual;
pub mod sink;
pub mod solver;
pub mod workspace;

pub use config::{Decomposition, SolverOptions};
pub use problem::ConvexProgram;
pub use residual::Residual;
pub use sink::{DiagnosticSink, NoOpSink, TraceSink};
pub use solver::{Outcome, PrimalDualIpm, SolveError};
