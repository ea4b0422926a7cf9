use crate::error::{KernelError, Result};

/// Dense n×n `i32` matrix in one contiguous row-major block.
///
/// Row `i` occupies `[i * n, (i + 1) * n)` of the backing storage, so row
/// `i + 1` immediately follows row `i`. The blocked kernel depends on this
/// layout to keep tile slices of `A` cache resident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareMatrix {
    n: usize,
    data: Vec<i32>,
}

impl SquareMatrix {
    /// Allocate a zero-filled n×n matrix.
    ///
    /// # Errors
    /// Returns `AllocationFailure` if `n * n` overflows or the backing
    /// storage cannot be reserved.
    pub fn allocate(n: usize) -> Result<Self> {
        let elements = n
            .checked_mul(n)
            .ok_or(KernelError::AllocationFailure { elements: usize::MAX })?;
        let data = alloc_vector(elements)?;
        Ok(SquareMatrix { n, data })
    }

    /// Wrap an existing row-major buffer of `n * n` elements.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if `data.len() != n * n`.
    pub fn from_vec(n: usize, data: Vec<i32>) -> Result<Self> {
        MatrixRef::new(n, &data)?;
        Ok(SquareMatrix { n, data })
    }

    /// Edge length `n`.
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Returns true for the 0×0 matrix.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [i32] {
        &mut self.data
    }

    /// Borrowed view for passing to kernels.
    pub fn view(&self) -> MatrixRef<'_> {
        MatrixRef {
            n: self.n,
            data: &self.data,
        }
    }

    /// Row `i` as a contiguous slice of length `n`.
    ///
    /// # Panics
    /// Panics if `i >= n`.
    pub fn row(&self, i: usize) -> &[i32] {
        self.view().row(i)
    }

    /// Mutable row `i`.
    ///
    /// # Panics
    /// Panics if `i >= n`.
    pub fn row_mut(&mut self, i: usize) -> &mut [i32] {
        let n = self.n;
        &mut self.data[i * n..(i + 1) * n]
    }

    /// Iterator over all rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[i32]> {
        self.view().rows()
    }

    /// Element `A[i][j]`, or `None` when out of bounds.
    pub fn get(&self, i: usize, j: usize) -> Option<i32> {
        self.view().get(i, j)
    }

    /// Consume the matrix and return its backing buffer.
    pub fn into_vec(self) -> Vec<i32> {
        self.data
    }
}

/// Read-only n×n row-major matrix borrowed from any contiguous buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixRef<'a> {
    n: usize,
    data: &'a [i32],
}

impl<'a> MatrixRef<'a> {
    /// View `data` as an n×n row-major matrix.
    ///
    /// # Errors
    /// Returns `DimensionMismatch` if `data.len() != n * n`.
    pub fn new(n: usize, data: &'a [i32]) -> Result<Self> {
        let expected = n
            .checked_mul(n)
            .ok_or(KernelError::AllocationFailure { elements: usize::MAX })?;
        if data.len() != expected {
            return Err(KernelError::DimensionMismatch {
                what: "matrix",
                expected,
                got: data.len(),
            });
        }
        Ok(MatrixRef { n, data })
    }

    pub fn dim(&self) -> usize {
        self.n
    }

    pub fn as_slice(&self) -> &'a [i32] {
        self.data
    }

    /// # Panics
    /// Panics if `i >= n`.
    pub fn row(&self, i: usize) -> &'a [i32] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a [i32]> {
        // chunks_exact(0) panics, and a 0×0 matrix has no rows anyway.
        self.data.chunks_exact(self.n.max(1))
    }

    pub fn get(&self, i: usize, j: usize) -> Option<i32> {
        if i < self.n && j < self.n {
            Some(self.data[i * self.n + j])
        } else {
            None
        }
    }
}

impl<'a> From<&'a SquareMatrix> for MatrixRef<'a> {
    fn from(m: &'a SquareMatrix) -> Self {
        m.view()
    }
}

/// Allocate a zero-filled vector of `len` elements, reporting failure
/// instead of aborting the process.
pub fn alloc_vector(len: usize) -> Result<Vec<i32>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| KernelError::AllocationFailure { elements: len })?;
    v.resize(len, 0);
    Ok(v)
}

/// Convert a signed size coming from an untyped boundary into `usize`.
///
/// # Errors
/// Returns `InvalidSize` for negative `n`.
pub fn validate_size(n: i64) -> Result<usize> {
    if n < 0 {
        return Err(KernelError::InvalidSize { n });
    }
    usize::try_from(n).map_err(|_| KernelError::AllocationFailure { elements: usize::MAX })
}
