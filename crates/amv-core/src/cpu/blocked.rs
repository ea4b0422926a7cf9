use std::sync::atomic::{AtomicI32, Ordering};

use tracing::{trace, trace_span};

use super::dot;
use crate::config::BlockedReduction;
use crate::error::Result;
use crate::kernel::{check_vectors, MatVecKernel, Strategy};
use crate::matrix::MatrixRef;
use crate::schedule::{parallel_for, parallel_for_mut, Schedule};
use crate::tile::TileGrid;

const _: () = assert!(std::mem::size_of::<AtomicI32>() == std::mem::size_of::<i32>());
const _: () = assert!(std::mem::align_of::<AtomicI32>() == std::mem::align_of::<i32>());

/// Reinterpret an exclusively borrowed `i32` slice as atomics.
fn as_atomic(y: &mut [i32]) -> &[AtomicI32] {
    // SAFETY: AtomicI32 has the same size, alignment (asserted above) and bit
    // validity as i32. The exclusive borrow rules out any non-atomic access
    // for as long as the returned view is alive.
    unsafe { &*(y as *mut [i32] as *const [AtomicI32]) }
}

/// Cache-blocked tile-parallel kernel.
///
/// The matrix is cut into `tile_edge`-sized tiles. With
/// [`BlockedReduction::Atomic`] the kernel runs two regions:
///
/// 1. zero `y`, statically split across workers;
/// 2. hand out tiles per `schedule` (dynamic, chunk 1, by default). For each
///    row of a claimed tile the worker sums the tile's columns privately and
///    merges the partial into `y[i]` with a fetch-add, because other column
///    tiles of the same row may be running on other workers.
///
/// With [`BlockedReduction::RowOwned`] every row tile is processed by one
/// worker across all column tiles, so `y` is written without atomics; tiles
/// can no longer be balanced independently. Both variants run on
/// [`crate::schedule`] regions.
#[derive(Debug, Clone)]
pub struct BlockedParallelKernel {
    workers: usize,
    tile_edge: usize,
    schedule: Schedule,
    reduction: BlockedReduction,
}

impl BlockedParallelKernel {
    pub fn new(
        workers: usize,
        tile_edge: usize,
        schedule: Schedule,
        reduction: BlockedReduction,
    ) -> Self {
        Self {
            workers: workers.max(1),
            tile_edge: tile_edge.max(1),
            schedule,
            reduction,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn tile_edge(&self) -> usize {
        self.tile_edge
    }

    pub fn reduction(&self) -> BlockedReduction {
        self.reduction
    }

    fn multiply_atomic(&self, a: MatrixRef<'_>, x: &[i32], y: &mut [i32]) {
        parallel_for_mut(y, self.workers, Schedule::Static, |_, out| out.fill(0));

        let grid = TileGrid::new(a.dim(), self.tile_edge);
        trace!(tiles = grid.len(), per_side = grid.per_side(), "tiled accumulate");
        let acc = as_atomic(y);
        parallel_for(grid.len(), self.workers, self.schedule, |tiles| {
            for k in tiles {
                let tile = grid.tile(k);
                let xs = &x[tile.cols.clone()];
                for i in tile.rows {
                    let partial = dot(&a.row(i)[tile.cols.clone()], xs);
                    acc[i].fetch_add(partial, Ordering::Relaxed);
                }
            }
        });
    }

    /// `schedule` is counted in tiles; the row-owned region splits rows, so
    /// chunk sizes are scaled by the tile edge.
    fn row_schedule(&self) -> Schedule {
        match self.schedule {
            Schedule::Static => Schedule::Static,
            Schedule::Dynamic { chunk } => Schedule::Dynamic {
                chunk: chunk.saturating_mul(self.tile_edge),
            },
            Schedule::Guided { min_chunk } => Schedule::Guided {
                min_chunk: min_chunk.saturating_mul(self.tile_edge),
            },
        }
    }

    fn multiply_row_owned(&self, a: MatrixRef<'_>, x: &[i32], y: &mut [i32]) {
        let n = a.dim();
        let edge = self.tile_edge;
        parallel_for_mut(y, self.workers, self.row_schedule(), |rows, out| {
            out.fill(0);
            for jj in (0..n).step_by(edge) {
                let cols = jj..(jj + edge).min(n);
                let xs = &x[cols.clone()];
                for (yi, i) in out.iter_mut().zip(rows.clone()) {
                    *yi = yi.wrapping_add(dot(&a.row(i)[cols.clone()], xs));
                }
            }
        });
    }
}

impl MatVecKernel for BlockedParallelKernel {
    fn name(&self) -> &str {
        Strategy::BlockedParallel.name()
    }

    fn strategy(&self) -> Strategy {
        Strategy::BlockedParallel
    }

    fn multiply(&self, a: MatrixRef<'_>, x: &[i32], y: &mut [i32]) -> Result<()> {
        let n = a.dim();
        check_vectors(n, x, y)?;
        if n == 0 {
            return Ok(());
        }
        let _span = trace_span!(
            "blocked_parallel",
            n,
            workers = self.workers,
            tile_edge = self.tile_edge,
            reduction = %self.reduction
        )
        .entered();

        match self.reduction {
            BlockedReduction::Atomic => self.multiply_atomic(a, x, y),
            BlockedReduction::RowOwned => self.multiply_row_owned(a, x, y),
        }
        Ok(())
    }
}
