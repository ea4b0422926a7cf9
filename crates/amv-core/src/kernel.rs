use std::fmt::{self, Debug};

use crate::error::{KernelError, Result};
use crate::matrix::MatrixRef;

/// Execution strategy chosen for one multiply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Sequential,
    FlatParallel,
    BlockedParallel,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::FlatParallel => "flat-parallel",
            Strategy::BlockedParallel => "blocked-parallel",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A matrix-vector multiply implementation: `y = A·x`.
///
/// Implementations read `a` and `x`, and fully overwrite every element of
/// `y`. All of them produce identical results for identical inputs; they
/// differ only in how the work is executed. Products and sums wrap on
/// `i32` overflow.
pub trait MatVecKernel: Send + Sync + Debug {
    /// Returns the name of this kernel (e.g. "sequential").
    fn name(&self) -> &str;

    fn strategy(&self) -> Strategy;

    /// Compute `y = a · x`.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if `x` or `y` is not `a.dim()` long.
    fn multiply(&self, a: MatrixRef<'_>, x: &[i32], y: &mut [i32]) -> Result<()>;
}

/// Check that `x` and `y` both have length `n`.
pub(crate) fn check_vectors(n: usize, x: &[i32], y: &[i32]) -> Result<()> {
    if x.len() != n {
        return Err(KernelError::DimensionMismatch {
            what: "x",
            expected: n,
            got: x.len(),
        });
    }
    if y.len() != n {
        return Err(KernelError::DimensionMismatch {
            what: "y",
            expected: n,
            got: y.len(),
        });
    }
    Ok(())
}
