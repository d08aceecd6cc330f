//! Error code translation between the Rust API and C callers
//!
//! Converts between `KernelResult<T>` and Linux's integer errno values.

use kestrel_ffi::{c_int, KernelError, KernelResult};

/// Convert a Result to Linux errno format
///
/// - Ok(value) => 0
/// - Err(error) => negative errno
pub fn result_to_errno<T>(result: KernelResult<T>) -> c_int {
    match result {
        Ok(_) => 0,
        Err(e) => e.to_errno(),
    }
}

/// Convert errno to Result
///
/// - 0 => Ok(())
/// - negative => Err(KernelError)
/// - positive or unknown => Err(EINVAL)
pub fn errno_to_result(errno: c_int) -> KernelResult<()> {
    if errno == 0 {
        return Ok(());
    }

    match errno.checked_neg() {
        Some(1) => Err(KernelError::EPERM),
        Some(2) => Err(KernelError::ENOENT),
        Some(14) => Err(KernelError::EFAULT),
        _ => Err(KernelError::EINVAL),
    }
}
