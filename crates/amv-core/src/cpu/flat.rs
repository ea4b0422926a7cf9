use tracing::trace_span;

use super::dot;
use crate::error::Result;
use crate::kernel::{check_vectors, MatVecKernel, Strategy};
use crate::matrix::MatrixRef;
use crate::schedule::{parallel_for_mut, Schedule};

/// Row-parallel kernel.
///
/// Rows are split into disjoint ranges; each range, and the matching slice
/// of `y`, belongs to exactly one worker for the whole call. Workers never
/// share an output element, so no synchronization is needed beyond the
/// join at the end of the region.
#[derive(Debug, Clone)]
pub struct FlatParallelKernel {
    workers: usize,
    schedule: Schedule,
}

impl FlatParallelKernel {
    pub fn new(workers: usize, schedule: Schedule) -> Self {
        Self {
            workers: workers.max(1),
            schedule,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn schedule(&self) -> Schedule {
        self.schedule
    }
}

impl MatVecKernel for FlatParallelKernel {
    fn name(&self) -> &str {
        Strategy::FlatParallel.name()
    }

    fn strategy(&self) -> Strategy {
        Strategy::FlatParallel
    }

    fn multiply(&self, a: MatrixRef<'_>, x: &[i32], y: &mut [i32]) -> Result<()> {
        let n = a.dim();
        check_vectors(n, x, y)?;
        let _span = trace_span!("flat_parallel", n, workers = self.workers).entered();

        parallel_for_mut(y, self.workers, self.schedule, |rows, out| {
            for (yi, i) in out.iter_mut().zip(rows) {
                *yi = dot(a.row(i), x);
            }
        });
        Ok(())
    }
}
