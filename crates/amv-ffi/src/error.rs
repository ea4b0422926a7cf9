use std::cell::RefCell;
use std::ffi::CString;

use amv_core::KernelError;
use thiserror::Error;
use tracing::warn;

use crate::types::AmvStatus;

#[derive(Error, Debug)]
pub enum FfiError {
    #[error("null argument: {0}")]
    NullArgument(&'static str),
    #[error("output buffer y overlaps {0}")]
    Aliasing(&'static str),
    #[error("internal panic")]
    Panic,
    #[error(transparent)]
    Kernel(#[from] KernelError),
}

impl FfiError {
    pub fn status(&self) -> AmvStatus {
        match self {
            FfiError::NullArgument(_) | FfiError::Aliasing(_) => AmvStatus::ErrorInvalidArgument,
            FfiError::Panic => AmvStatus::ErrorInternal,
            FfiError::Kernel(e) => e.into(),
        }
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Record `err` as this thread's last error and return its status code.
pub fn report(err: FfiError) -> AmvStatus {
    let status = err.status();
    warn!(?status, error = %err, "ffi call failed");
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(err.to_string()).ok();
    });
    status
}

/// Take the last error message, leaving `None` in its place.
pub fn take_last_error() -> Option<CString> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}
