//! Reproducible input generation for tests and benchmarks.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{KernelError, Result};
use crate::matrix::{alloc_vector, SquareMatrix};

/// Fill `a` with `A[i][j] = (i + j) % 10 + 1` and `x` with `x[i] = i + 1`.
///
/// # Errors
/// Returns `DimensionMismatch` if `x.len()` differs from `a.dim()`.
pub fn fill_deterministic(a: &mut SquareMatrix, x: &mut [i32]) -> Result<()> {
    let n = a.dim();
    if x.len() != n {
        return Err(KernelError::DimensionMismatch {
            what: "x",
            expected: n,
            got: x.len(),
        });
    }
    for (i, xi) in x.iter_mut().enumerate() {
        *xi = i as i32 + 1;
        for (j, aij) in a.row_mut(i).iter_mut().enumerate() {
            *aij = ((i + j) % 10) as i32 + 1;
        }
    }
    Ok(())
}

/// Allocate and deterministically fill an n×n matrix and its vector.
pub fn deterministic(n: usize) -> Result<(SquareMatrix, Vec<i32>)> {
    let mut a = SquareMatrix::allocate(n)?;
    let mut x = alloc_vector(n)?;
    fill_deterministic(&mut a, &mut x)?;
    Ok((a, x))
}

/// Allocate an n×n matrix and vector with values drawn uniformly from
/// `[-bound, bound]` by a generator seeded with `seed`.
///
/// # Errors
/// Returns `InvalidConfig` for a negative `bound`.
pub fn random(n: usize, seed: u64, bound: i32) -> Result<(SquareMatrix, Vec<i32>)> {
    if bound < 0 {
        return Err(KernelError::InvalidConfig(format!(
            "random fill bound must be >= 0, got {}",
            bound
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut a = SquareMatrix::allocate(n)?;
    let mut x = alloc_vector(n)?;
    for v in a.as_mut_slice() {
        *v = rng.gen_range(-bound..=bound);
    }
    for v in x.iter_mut() {
        *v = rng.gen_range(-bound..=bound);
    }
    Ok((a, x))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_small() {
        let (a, x) = deterministic(3).unwrap();
        assert_eq!(a.as_slice(), &[1, 2, 3, 2, 3, 4, 3, 4, 5]);
        assert_eq!(x, vec![1, 2, 3]);
    }

    #[test]
    fn test_deterministic_wraps_mod_10() {
        let (a, _) = deterministic(12).unwrap();
        assert_eq!(a.get(0, 9), Some(10));
        assert_eq!(a.get(0, 10), Some(1));
        assert_eq!(a.get(11, 11), Some(3));
    }

    #[test]
    fn test_fill_length_mismatch() {
        let mut a = SquareMatrix::allocate(4).unwrap();
        let mut x = vec![0; 3];
        assert!(fill_deterministic(&mut a, &mut x).is_err());
    }

    #[test]
    fn test_random_reproducible() {
        let (a1, x1) = random(16, 7, 100).unwrap();
        let (a2, x2) = random(16, 7, 100).unwrap();
        assert_eq!(a1, a2);
        assert_eq!(x1, x2);
        assert!(a1.as_slice().iter().all(|v| (-100..=100).contains(v)));

        let (a3, _) = random(16, 8, 100).unwrap();
        assert_ne!(a1, a3);
    }

    #[test]
    fn test_random_negative_bound() {
        assert!(random(4, 0, -1).is_err());
    }
}
