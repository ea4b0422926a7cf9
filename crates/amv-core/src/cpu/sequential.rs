use tracing::trace_span;

use super::dot;
use crate::error::Result;
use crate::kernel::{check_vectors, MatVecKernel, Strategy};
use crate::matrix::MatrixRef;

/// Single-threaded row-by-row dot products. The ground truth every other
/// kernel is checked against.
#[derive(Debug, Clone, Default)]
pub struct SequentialKernel;

impl SequentialKernel {
    pub fn new() -> Self {
        SequentialKernel
    }
}

impl MatVecKernel for SequentialKernel {
    fn name(&self) -> &str {
        Strategy::Sequential.name()
    }

    fn strategy(&self) -> Strategy {
        Strategy::Sequential
    }

    fn multiply(&self, a: MatrixRef<'_>, x: &[i32], y: &mut [i32]) -> Result<()> {
        let n = a.dim();
        check_vectors(n, x, y)?;
        let _span = trace_span!("sequential", n).entered();

        for (yi, row) in y.iter_mut().zip(a.rows()) {
            *yi = dot(row, x);
        }
        Ok(())
    }
}
