use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("invalid size: n={n} (must be >= 0 and addressable)")]
    InvalidSize { n: i64 },
    #[error("allocation failure: could not reserve {elements} elements")]
    AllocationFailure { elements: usize },
    #[error("{what} length mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, KernelError>;
