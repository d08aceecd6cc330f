//! FFI compatibility layer for C/Rust interoperability
//!
//! This crate provides the error type and C scalar types shared by the tree
//! core and its C ABI surface.

#![cfg_attr(not(test), no_std)]
#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]

pub use libc::{c_int, c_uint};

/// Error codes matching Linux kernel errno values
///
/// The tree core only ever produces [`KernelError::EINVAL`]; the remaining
/// codes exist so the C boundary can decode any errno it is handed.
#[repr(i32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KernelError {
    #[error("operation not permitted")]
    EPERM = 1,
    #[error("no such entry")]
    ENOENT = 2,
    #[error("bad address")]
    EFAULT = 14,
    #[error("invalid argument")]
    EINVAL = 22,
}

impl KernelError {
    /// Negative errno, the way kernel functions report failure.
    pub fn to_errno(self) -> c_int {
        -(self as c_int)
    }
}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

static_assertions::assert_eq_size!(KernelError, i32);
