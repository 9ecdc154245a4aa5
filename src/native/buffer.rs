//! Owned wrapper around one native output handle.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr::NonNull;

use crate::error::PhonexError;
use crate::native::symbols::{CharFreeFn, VoidFreeFn};

/// The release function matching the allocation.
#[derive(Debug, Clone, Copy)]
pub enum Release {
    Char(CharFreeFn),
    Void(VoidFreeFn),
}

/// A NUL-terminated buffer allocated by a native library.
///
/// Dropping it calls the release function exactly once.
#[derive(Debug)]
pub struct NativeBuffer {
    ptr: NonNull<c_char>,
    release: Release,
}

impl NativeBuffer {
    /// Takes ownership of `ptr`. A null pointer is a `NativeAllocation` error and
    /// nothing is released.
    ///
    /// # Safety
    /// A non-null `ptr` must point to a NUL-terminated buffer that `release`
    /// frees, and nobody else may free it.
    pub unsafe fn from_raw(ptr: *mut c_char, release: Release, function: &str) -> Result<Self, PhonexError> {
        match NonNull::new(ptr) {
            Some(ptr) => Ok(Self { ptr, release }),
            None => Err(PhonexError::NativeAllocation(format!(
                "{} returned a null output handle",
                function
            ))),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: `from_raw` guarantees a live NUL-terminated buffer until drop.
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }.to_bytes()
    }

    /// The buffer decoded as UTF-8.
    pub fn to_text(&self) -> Result<String, PhonexError> {
        std::str::from_utf8(self.as_bytes())
            .map(str::to_string)
            .map_err(|err| PhonexError::NativeDecode(err.to_string()))
    }
}

impl Drop for NativeBuffer {
    fn drop(&mut self) {
        // SAFETY: the pointer came from the allocator paired with `release` and is
        // released only here.
        unsafe {
            match self.release {
                Release::Char(free) => free(self.ptr.as_ptr()),
                Release::Void(free) => free(self.ptr.as_ptr().cast()),
            }
        }
    }
}
