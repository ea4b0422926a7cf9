mod context;
mod error;
mod types;

pub use context::*;
pub use error::*;
pub use types::*;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::AssertUnwindSafe;

use amv_core::{init, validate_size, Dispatcher, KernelConfig, KernelError, SquareMatrix, Strategy};

/// Run `f`, converting its error or any panic into a status code and
/// recording the message for `amv_last_error`.
fn ffi_call<F>(f: F) -> AmvStatus
where
    F: FnOnce() -> Result<(), FfiError>,
{
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => AmvStatus::Ok,
        Ok(Err(e)) => report(e),
        Err(_) => report(FfiError::Panic),
    }
}

/// Borrow `len` elements at `ptr`. A zero length accepts any pointer,
/// including null.
unsafe fn slice_in<'a>(ptr: *const i32, len: usize, what: &'static str) -> Result<&'a [i32], FfiError> {
    if len == 0 {
        return Ok(&[]);
    }
    if ptr.is_null() {
        return Err(FfiError::NullArgument(what));
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

unsafe fn slice_out<'a>(ptr: *mut i32, len: usize, what: &'static str) -> Result<&'a mut [i32], FfiError> {
    if len == 0 {
        return Ok(&mut []);
    }
    if ptr.is_null() {
        return Err(FfiError::NullArgument(what));
    }
    Ok(std::slice::from_raw_parts_mut(ptr, len))
}

/// Element count of a `rows`×`n` buffer. Buffers whose byte size exceeds
/// `isize::MAX` cannot exist, so such sizes are rejected as `InvalidSize`.
fn buffer_len(n: usize, rows: usize) -> Result<usize, KernelError> {
    rows.checked_mul(n)
        .filter(|len| {
            len.checked_mul(std::mem::size_of::<i32>())
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        })
        .ok_or(KernelError::InvalidSize { n: n as i64 })
}

fn byte_end(p: *const i32, len: usize) -> Option<usize> {
    len.checked_mul(std::mem::size_of::<i32>())?
        .checked_add(p as usize)
}

/// Whether two element ranges share any byte. A range whose end cannot be
/// represented counts as overlapping.
fn overlaps(a: *const i32, a_len: usize, b: *const i32, b_len: usize) -> bool {
    if a_len == 0 || b_len == 0 {
        return false;
    }
    match (byte_end(a, a_len), byte_end(b, b_len)) {
        (Some(a_end), Some(b_end)) => (a as usize) < b_end && (b as usize) < a_end,
        _ => true,
    }
}

unsafe fn write_strategy(out: *mut AmvStrategy, strategy: Strategy) {
    if !out.is_null() {
        *out = strategy.into();
    }
}

/// Write the default configuration into `*out`.
#[no_mangle]
pub unsafe extern "C" fn amv_config_default(out: *mut AmvConfig) -> AmvStatus {
    ffi_call(|| {
        if out.is_null() {
            return Err(FfiError::NullArgument("out"));
        }
        *out = AmvConfig::from(&KernelConfig::default());
        Ok(())
    })
}

/// Create a context. `config` may be null to use the defaults.
///
/// On success writes a heap-allocated `AmvContext` pointer into `*ctx_out`.
/// The caller must later call `amv_context_destroy`.
#[no_mangle]
pub unsafe extern "C" fn amv_context_create(
    config: *const AmvConfig,
    ctx_out: *mut *mut AmvContext,
) -> AmvStatus {
    ffi_call(|| {
        if ctx_out.is_null() {
            return Err(FfiError::NullArgument("ctx_out"));
        }
        let ctx = if config.is_null() {
            AmvContext::default()
        } else {
            AmvContext::new(KernelConfig::from(&*config))?
        };
        *ctx_out = Box::into_raw(Box::new(ctx));
        Ok(())
    })
}

/// Destroy a context created by `amv_context_create`. Null is a no-op.
#[no_mangle]
pub unsafe extern "C" fn amv_context_destroy(ctx: *mut AmvContext) -> AmvStatus {
    if !ctx.is_null() {
        drop(Box::from_raw(ctx));
    }
    AmvStatus::Ok
}

/// Allocate a zeroed n×n matrix in one contiguous block.
///
/// Fails with `ErrorInvalidSize` for `n < 0` and `ErrorOutOfMemory` if the
/// storage cannot be obtained. Free with `amv_matrix_destroy`.
#[no_mangle]
pub unsafe extern "C" fn amv_matrix_create(n: i64, out: *mut *mut AmvMatrix) -> AmvStatus {
    ffi_call(|| {
        if out.is_null() {
            return Err(FfiError::NullArgument("out"));
        }
        let matrix = SquareMatrix::allocate(validate_size(n)?)?;
        *out = Box::into_raw(Box::new(AmvMatrix { matrix }));
        Ok(())
    })
}

/// Release a matrix and its storage. Null is a no-op.
#[no_mangle]
pub unsafe extern "C" fn amv_matrix_destroy(m: *mut AmvMatrix) -> AmvStatus {
    if !m.is_null() {
        drop(Box::from_raw(m));
    }
    AmvStatus::Ok
}

/// Edge length of the matrix, or -1 for null.
#[no_mangle]
pub unsafe extern "C" fn amv_matrix_dim(m: *const AmvMatrix) -> i64 {
    match m.as_ref() {
        Some(m) => m.matrix.dim() as i64,
        None => -1,
    }
}

/// Pointer to the first of the n*n row-major elements. Row `i` starts at
/// offset `i * n`. Returns null for a null handle.
#[no_mangle]
pub unsafe extern "C" fn amv_matrix_data(m: *mut AmvMatrix) -> *mut i32 {
    match m.as_mut() {
        Some(m) => m.matrix.as_mut_slice().as_mut_ptr(),
        None => std::ptr::null_mut(),
    }
}

/// Fill the matrix with `A[i][j] = (i + j) % 10 + 1` and `x` with
/// `x[i] = i + 1`. `n` must equal the matrix dimension.
#[no_mangle]
pub unsafe extern "C" fn amv_matrix_fill_deterministic(
    m: *mut AmvMatrix,
    x: *mut i32,
    n: i64,
) -> AmvStatus {
    ffi_call(|| {
        let m = m.as_mut().ok_or(FfiError::NullArgument("m"))?;
        let n = validate_size(n)?;
        buffer_len(n, 1)?;
        let x = slice_out(x, n, "x")?;
        init::fill_deterministic(&mut m.matrix, x)?;
        Ok(())
    })
}

/// Compute `y = A·x` for a caller-owned row-major buffer `a` of n*n
/// elements.
///
/// `ctx` may be null to use a default-configured dispatcher. When
/// `strategy_out` is non-null it receives the strategy that ran. `y` must
/// not overlap `a` or `x`; overlap is rejected with `ErrorInvalidArgument`.
#[no_mangle]
pub unsafe extern "C" fn amv_multiply(
    ctx: *const AmvContext,
    a: *const i32,
    x: *const i32,
    y: *mut i32,
    n: i64,
    strategy_out: *mut AmvStrategy,
) -> AmvStatus {
    ffi_call(|| {
        let n = validate_size(n)?;
        let elements = buffer_len(n, n)?;
        if overlaps(y, n, a, elements) {
            return Err(FfiError::Aliasing("a"));
        }
        if overlaps(y, n, x, n) {
            return Err(FfiError::Aliasing("x"));
        }
        let a = slice_in(a, elements, "a")?;
        let x = slice_in(x, n, "x")?;
        let y = slice_out(y, n, "y")?;

        let strategy = match ctx.as_ref() {
            Some(ctx) => ctx.dispatcher.multiply_raw(a, x, y, n)?,
            None => Dispatcher::with_defaults().multiply_raw(a, x, y, n)?,
        };
        write_strategy(strategy_out, strategy);
        Ok(())
    })
}

/// Compute `y = A·x` for a matrix handle. Both vectors must hold
/// `amv_matrix_dim(m)` elements.
#[no_mangle]
pub unsafe extern "C" fn amv_multiply_matrix(
    ctx: *const AmvContext,
    m: *const AmvMatrix,
    x: *const i32,
    y: *mut i32,
    strategy_out: *mut AmvStrategy,
) -> AmvStatus {
    ffi_call(|| {
        let m = m.as_ref().ok_or(FfiError::NullArgument("m"))?;
        let n = m.matrix.dim();
        let data = m.matrix.as_slice();
        if overlaps(y, n, data.as_ptr(), data.len()) {
            return Err(FfiError::Aliasing("a"));
        }
        if overlaps(y, n, x, n) {
            return Err(FfiError::Aliasing("x"));
        }
        let x = slice_in(x, n, "x")?;
        let y = slice_out(y, n, "y")?;

        let strategy = match ctx.as_ref() {
            Some(ctx) => ctx.dispatcher.multiply(&m.matrix, x, y)?,
            None => Dispatcher::with_defaults().multiply(&m.matrix, x, y)?,
        };
        write_strategy(strategy_out, strategy);
        Ok(())
    })
}

/// Retrieve the last error message on this thread.
///
/// Returns null if no error has occurred. The caller must free the returned
/// string with `amv_free_string`.
#[no_mangle]
pub extern "C" fn amv_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `amv_last_error`.
#[no_mangle]
pub unsafe extern "C" fn amv_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::ptr;

    fn last_error() -> String {
        let p = amv_last_error();
        assert!(!p.is_null());
        let msg = unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned();
        unsafe { amv_free_string(p as *mut c_char) };
        msg
    }

    fn context(workers: usize) -> *mut AmvContext {
        let mut config = unsafe {
            let mut c = std::mem::MaybeUninit::<AmvConfig>::uninit();
            assert_eq!(amv_config_default(c.as_mut_ptr()), AmvStatus::Ok);
            c.assume_init()
        };
        config.worker_count = workers;
        let mut ctx = ptr::null_mut();
        assert_eq!(unsafe { amv_context_create(&config, &mut ctx) }, AmvStatus::Ok);
        assert!(!ctx.is_null());
        ctx
    }

    #[test]
    fn test_config_round_trip() {
        let core = KernelConfig::default();
        let c = AmvConfig::from(&core);
        assert_eq!(c.sequential_max, 20);
        assert_eq!(c.flat_max, 200);
        assert_eq!(c.tile_edge, 64);
        assert_eq!(c.blocked_schedule.kind, AmvScheduleKind::Dynamic);
        assert_eq!(c.blocked_schedule.chunk, 1);
        assert_eq!(KernelConfig::from(&c), core);
    }

    #[test]
    fn test_multiply_raw_buffers() {
        let ctx = context(4);
        let a = [1, 2, 3, 4, 5, 6, 7, 8, 9];
        let x = [1, 2, 3];
        let mut y = [0; 3];
        let mut strategy = AmvStrategy::BlockedParallel;
        let status = unsafe {
            amv_multiply(ctx, a.as_ptr(), x.as_ptr(), y.as_mut_ptr(), 3, &mut strategy)
        };
        assert_eq!(status, AmvStatus::Ok);
        assert_eq!(y, [14, 32, 50]);
        assert_eq!(strategy, AmvStrategy::Sequential);
        unsafe { amv_context_destroy(ctx) };
    }

    #[test]
    fn test_negative_size() {
        let mut y = [0; 1];
        let status = unsafe {
            amv_multiply(ptr::null(), ptr::null(), ptr::null(), y.as_mut_ptr(), -1, ptr::null_mut())
        };
        assert_eq!(status, AmvStatus::ErrorInvalidSize);
        assert!(last_error().contains("n=-1"));

        let mut m = ptr::null_mut();
        assert_eq!(unsafe { amv_matrix_create(-3, &mut m) }, AmvStatus::ErrorInvalidSize);
        assert!(m.is_null());
    }

    #[test]
    fn test_zero_size_accepts_null_buffers() {
        let mut strategy = AmvStrategy::BlockedParallel;
        let status = unsafe {
            amv_multiply(ptr::null(), ptr::null(), ptr::null(), ptr::null_mut(), 0, &mut strategy)
        };
        assert_eq!(status, AmvStatus::Ok);
        assert_eq!(strategy, AmvStrategy::Sequential);
    }

    #[test]
    fn test_null_buffer_rejected() {
        let x = [1, 2];
        let mut y = [0; 2];
        let status = unsafe {
            amv_multiply(ptr::null(), ptr::null(), x.as_ptr(), y.as_mut_ptr(), 2, ptr::null_mut())
        };
        assert_eq!(status, AmvStatus::ErrorInvalidArgument);
        assert!(last_error().contains("null"));
    }

    #[test]
    fn test_aliasing_rejected() {
        let mut buf = [1, 0, 0, 1];
        let x = [1, 1];
        let p = buf.as_mut_ptr();
        let status = unsafe { amv_multiply(ptr::null(), p, x.as_ptr(), p, 2, ptr::null_mut()) };
        assert_eq!(status, AmvStatus::ErrorInvalidArgument);
        assert!(last_error().contains("overlaps a"));
        assert_eq!(buf, [1, 0, 0, 1]);

        let a = [1, 2, 3, 4];
        let mut v = [1, 1];
        let p = v.as_mut_ptr();
        let status = unsafe { amv_multiply(ptr::null(), a.as_ptr(), p, p, 2, ptr::null_mut()) };
        assert_eq!(status, AmvStatus::ErrorInvalidArgument);
        assert!(last_error().contains("overlaps x"));
        assert_eq!(v, [1, 1]);
    }

    #[test]
    fn test_unaddressable_size_rejected() {
        let a = [0; 4];
        let x = [0; 2];
        let mut y = [7; 2];
        for n in [1i64 << 31, 1i64 << 32, i64::MAX] {
            let status = unsafe {
                amv_multiply(ptr::null(), a.as_ptr(), x.as_ptr(), y.as_mut_ptr(), n, ptr::null_mut())
            };
            assert_eq!(status, AmvStatus::ErrorInvalidSize, "n={}", n);
            assert!(last_error().contains(&format!("n={}", n)));
        }
        assert_eq!(y, [7, 7]);
    }

    #[test]
    fn test_buffer_len_limits() {
        assert_eq!(buffer_len(3, 3), Ok(9));
        assert_eq!(buffer_len(0, 0), Ok(0));
        assert!(buffer_len(1 << 31, 1 << 31).is_err());
        assert!(buffer_len(usize::MAX / 2, 1).is_err());
    }

    #[test]
    fn test_overlaps_near_address_limit() {
        let top = (usize::MAX - 3) as *const i32;
        let low = 16 as *const i32;
        assert!(overlaps(top, 2, low, 1));
        assert!(!overlaps(low, 1, (low as usize + 4) as *const i32, 1));
        assert!(overlaps(low, 2, (low as usize + 4) as *const i32, 1));
    }

    #[test]
    fn test_matrix_handle_lifecycle() {
        let ctx = context(4);
        let n = 250i64;
        let mut m = ptr::null_mut();
        assert_eq!(unsafe { amv_matrix_create(n, &mut m) }, AmvStatus::Ok);
        assert_eq!(unsafe { amv_matrix_dim(m) }, n);

        let mut x = vec![0; n as usize];
        let mut y = vec![0; n as usize];
        assert_eq!(
            unsafe { amv_matrix_fill_deterministic(m, x.as_mut_ptr(), n) },
            AmvStatus::Ok
        );
        // A[1][2] = (1 + 2) % 10 + 1
        assert_eq!(unsafe { *amv_matrix_data(m).add(n as usize + 2) }, 4);

        let mut strategy = AmvStrategy::Sequential;
        let status =
            unsafe { amv_multiply_matrix(ctx, m, x.as_ptr(), y.as_mut_ptr(), &mut strategy) };
        assert_eq!(status, AmvStatus::Ok);
        assert_eq!(strategy, AmvStrategy::BlockedParallel);

        let (a, xs) = init::deterministic(n as usize).unwrap();
        let mut expected = vec![0; n as usize];
        Dispatcher::with_defaults()
            .kernel(Strategy::Sequential)
            .multiply(a.view(), &xs, &mut expected)
            .unwrap();
        assert_eq!(y, expected);

        unsafe {
            amv_matrix_destroy(m);
            amv_context_destroy(ctx);
        }
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AmvConfig::from(&KernelConfig::default());
        config.tile_edge = 0;
        let mut ctx = ptr::null_mut();
        assert_eq!(
            unsafe { amv_context_create(&config, &mut ctx) },
            AmvStatus::ErrorInvalidConfig
        );
        assert!(ctx.is_null());
    }

    #[test]
    fn test_null_handles() {
        assert_eq!(unsafe { amv_matrix_dim(ptr::null()) }, -1);
        assert!(unsafe { amv_matrix_data(ptr::null_mut()) }.is_null());
        assert_eq!(unsafe { amv_context_destroy(ptr::null_mut()) }, AmvStatus::Ok);
        assert_eq!(unsafe { amv_config_default(ptr::null_mut()) }, AmvStatus::ErrorInvalidArgument);
    }
}
