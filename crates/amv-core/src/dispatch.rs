use tracing::debug;

use crate::config::KernelConfig;
use crate::cpu::{BlockedParallelKernel, FlatParallelKernel, SequentialKernel};
use crate::error::Result;
use crate::kernel::{MatVecKernel, Strategy};
use crate::matrix::{MatrixRef, SquareMatrix};

/// Size-adaptive front end: picks a kernel from `n` and forwards the call.
///
/// Routing with the default thresholds:
///
/// | n          | kernel           |
/// |------------|------------------|
/// | `0..=20`   | sequential       |
/// | `21..=200` | flat parallel    |
/// | `201..`    | blocked parallel |
///
/// Holds no state between calls besides its configuration.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    config: KernelConfig,
    sequential: SequentialKernel,
    flat: FlatParallelKernel,
    blocked: BlockedParallelKernel,
}

impl Dispatcher {
    /// # Errors
    /// Returns `InvalidConfig` if `config` fails validation.
    pub fn new(config: KernelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Dispatcher with [`KernelConfig::default`].
    pub fn with_defaults() -> Self {
        Self::build(KernelConfig::default())
    }

    fn build(config: KernelConfig) -> Self {
        let flat = FlatParallelKernel::new(config.worker_count, config.flat_schedule);
        let blocked = BlockedParallelKernel::new(
            config.worker_count,
            config.tile_edge,
            config.blocked_schedule,
            config.reduction,
        );
        Self {
            config,
            sequential: SequentialKernel::new(),
            flat,
            blocked,
        }
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    /// The strategy used for an n×n problem.
    pub fn select(&self, n: usize) -> Strategy {
        if n <= self.config.sequential_max {
            Strategy::Sequential
        } else if n <= self.config.flat_max {
            Strategy::FlatParallel
        } else {
            Strategy::BlockedParallel
        }
    }

    /// The kernel behind `strategy`, for running it regardless of size.
    pub fn kernel(&self, strategy: Strategy) -> &dyn MatVecKernel {
        match strategy {
            Strategy::Sequential => &self.sequential,
            Strategy::FlatParallel => &self.flat,
            Strategy::BlockedParallel => &self.blocked,
        }
    }

    /// Compute `y = a · x` with the strategy selected for `a.dim()`, and
    /// report which one ran.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if `x` or `y` is not `a.dim()` long.
    pub fn multiply(&self, a: &SquareMatrix, x: &[i32], y: &mut [i32]) -> Result<Strategy> {
        self.multiply_ref(a.view(), x, y)
    }

    /// Like [`Dispatcher::multiply`] on a caller-owned row-major buffer of
    /// `n * n` elements.
    pub fn multiply_raw(&self, a: &[i32], x: &[i32], y: &mut [i32], n: usize) -> Result<Strategy> {
        self.multiply_ref(MatrixRef::new(n, a)?, x, y)
    }

    pub fn multiply_ref(&self, a: MatrixRef<'_>, x: &[i32], y: &mut [i32]) -> Result<Strategy> {
        let n = a.dim();
        let strategy = self.select(n);
        debug!(
            n,
            strategy = %strategy,
            workers = self.config.worker_count,
            "matvec dispatch"
        );
        self.kernel(strategy).multiply(a, x, y)?;
        Ok(strategy)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::with_defaults()
    }
}
