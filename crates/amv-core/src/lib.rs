//! `amv-core` - size-adaptive dense integer matrix-vector multiply.
//!
//! This crate provides:
//! - `SquareMatrix` / `MatrixRef`: row-major contiguous n×n `i32` storage
//! - Three interchangeable kernels behind the `MatVecKernel` trait:
//!   sequential, flat row-parallel, and cache-blocked tile-parallel
//! - A `Dispatcher` that picks a kernel from the problem size
//! - An explicit parallel-for with static, dynamic and guided scheduling
//! - Deterministic and seeded-random input initializers
//!
//! ```
//! use amv_core::{init, Dispatcher, KernelConfig, Strategy};
//!
//! let dispatcher = Dispatcher::new(KernelConfig::default().with_worker_count(4)).unwrap();
//! let (a, x) = init::deterministic(3).unwrap();
//! let mut y = vec![0; 3];
//! let strategy = dispatcher.multiply(&a, &x, &mut y).unwrap();
//! assert_eq!(strategy, Strategy::Sequential);
//! assert_eq!(y, vec![14, 20, 26]);
//! ```

pub mod config;
pub mod cpu;
pub mod dispatch;
pub mod error;
pub mod init;
pub mod kernel;
pub mod matrix;
pub mod schedule;
pub mod tile;

// Re-export primary types at the crate root for convenience.
pub use config::{BlockedReduction, KernelConfig};
pub use cpu::{BlockedParallelKernel, FlatParallelKernel, SequentialKernel};
pub use dispatch::Dispatcher;
pub use error::{KernelError, Result};
pub use kernel::{MatVecKernel, Strategy};
pub use matrix::{alloc_vector, validate_size, MatrixRef, SquareMatrix};
pub use schedule::Schedule;
pub use tile::{Tile, TileGrid};

/// Compute `y = a · x` with a default-configured [`Dispatcher`].
pub fn multiply(a: &SquareMatrix, x: &[i32], y: &mut [i32]) -> Result<Strategy> {
    Dispatcher::with_defaults().multiply(a, x, y)
}
