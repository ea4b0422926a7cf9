//! CPU kernels.
//!
//! `SequentialKernel` is the reference; `FlatParallelKernel` and
//! `BlockedParallelKernel` must reproduce its output bit for bit.

pub mod blocked;
pub mod flat;
pub mod sequential;

pub use blocked::BlockedParallelKernel;
pub use flat::FlatParallelKernel;
pub use sequential::SequentialKernel;

/// Wrapping dot product of two equal-length slices.
#[inline]
pub(crate) fn dot(a: &[i32], x: &[i32]) -> i32 {
    debug_assert_eq!(a.len(), x.len());
    a.iter()
        .zip(x)
        .fold(0i32, |acc, (&aij, &xj)| acc.wrapping_add(aij.wrapping_mul(xj)))
}
