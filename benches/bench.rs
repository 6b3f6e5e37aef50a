//! Solve-time benchmarks: one `divan` function per case.

use faer::{Col, Mat, mat};
use pdipm_core::{ConvexProgram, Decomposition, PrimalDualIpm, SolverOptions};

type E = f64;

fn main() {
    divan::main();
}

/// `min c^T x  s.t.  A x = b, x >= 0`, `n = 3, m = 3, p = 1`.
struct StandardFormLp;

impl ConvexProgram for StandardFormLp {
    type Error = std::convert::Infallible;

    fn n(&self) -> usize {
        3
    }
    fn m(&self) -> usize {
        3
    }
    fn p(&self) -> usize {
        1
    }

    fn initial_point(&self) -> Result<Col<E>, Self::Error> {
        Ok(Col::from_fn(3, |_| 1.0 / 3.0))
    }
    fn objective_grad(&self, _x: &Col<E>) -> Result<Col<E>, Self::Error> {
        Ok(Col::from_fn(3, |i| [-1.0, -2.0, 0.0][i]))
    }
    fn objective_hess(&self, _x: &Col<E>) -> Result<Mat<E>, Self::Error> {
        Ok(Mat::zeros(3, 3))
    }
    fn inequality(&self, x: &Col<E>) -> Result<Col<E>, Self::Error> {
        Ok(Col::from_fn(3, |i| -x[i]))
    }
    fn inequality_grad(&self, _x: &Col<E>) -> Result<Mat<E>, Self::Error> {
        Ok(mat![
            [-1.0, 0.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, -1.0]
        ])
    }
    fn inequality_hess(&self, _x: &Col<E>, _i: usize) -> Result<Mat<E>, Self::Error> {
        Ok(Mat::zeros(3, 3))
    }
    fn equality(&self) -> Result<(Mat<E>, Col<E>), Self::Error> {
        Ok((mat![[1.0, 1.0, 1.0]], Col::from_fn(1, |_| 1.0)))
    }
    fn finalize(
        &mut self,
        _x: &Col<E>,
        _lambda: &Col<E>,
        _nu: &Col<E>,
        _converged: bool,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[divan::bench]
fn standard_form_lp() {
    let mut problem = StandardFormLp;
    let mut solver = PrimalDualIpm::new(SolverOptions::default());
    divan::black_box(solver.start(&mut problem).expect("lp should solve"));
}

#[divan::bench(args = [Decomposition::Svd, Decomposition::Lu])]
fn standard_form_lp_by_decomp(decomp: Decomposition) {
    let mut problem = StandardFormLp;
    let options = SolverOptions {
        decomp,
        ..SolverOptions::default()
    };
    let mut solver = PrimalDualIpm::new(options);
    divan::black_box(solver.start(&mut problem).expect("lp should solve"));
}
