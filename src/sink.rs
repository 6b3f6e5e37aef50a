//! Diagnostic seam: the solver calls through this trait only, so it has
//! no compile-time dependency on any I/O facility.

use crate::E;

/// One row of per-iteration diagnostics, reported after the residual
/// evaluator runs and before the termination test.
#[derive(Debug, Clone, Copy)]
pub struct IterationReport {
    pub iter: usize,
    pub r_dual_norm: E,
    pub r_pri_norm: E,
    pub eta: E,
    pub step: E,
}

/// Hook invoked once per outer iteration with the current residual norms
/// and surrogate gap.
pub trait DiagnosticSink {
    /// Called once per completed iteration.
    fn report(&mut self, info: IterationReport);

    /// Called once when the solve finishes, with the outcome.
    fn finish(&mut self, converged: bool, iterations: usize) {
        let _ = (converged, iterations);
    }
}

/// A sink that discards every report. The default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpSink;

impl DiagnosticSink for NoOpSink {
    fn report(&mut self, _info: IterationReport) {}
}

/// Prints a fixed-width table row per iteration.
#[derive(Debug, Default, Clone, Copy)]
pub struct TraceSink;

impl DiagnosticSink for TraceSink {
    fn report(&mut self, info: IterationReport) {
        println!(
            "| {:4} | {:<10.3e} | {:<10.3e} | {:<10.3e} | {:<10.3e} |",
            info.iter, info.r_dual_norm, info.r_pri_norm, info.eta, info.step
        );
    }

    fn finish(&mut self, converged: bool, iterations: usize) {
        println!(
            "solve finished after {} iterations, converged = {}",
            iterations, converged
        );
    }
}
