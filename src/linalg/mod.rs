//! Dense matrix/vector storage and the operations the rest of the solver
//! is built from. `ops` holds the elementwise/BLAS-1-ish building blocks;
//! `kkt_solver` holds the pluggable KKT linear solve.

pub mod kkt_solver;
pub mod ops;
