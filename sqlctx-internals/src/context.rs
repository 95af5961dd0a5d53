//! The lifetime-bound invocation handle.
//!
//! This module encapsulates the `ptr` field of [`RawContext`], ensuring it is
//! only visible within this module. This visibility restriction guarantees the
//! safety invariant: **the pointer is non-null and was vouched for by the
//! caller of [`RawContext::new`]**.

use core::{marker::PhantomData, ptr::NonNull};

use crate::ffi::sqlite3_context;

/// A lifetime-bound pointer to the engine's per-invocation context.
///
/// The context belongs to the engine. A [`RawContext`] never frees it and
/// must not outlive the invocation that handed it out, which is what the
/// lifetime `'a` tracks.
///
/// # Safety invariants
///
/// This handle behaves like a `&'a mut sqlite3_context`:
///
/// 1. The pointee is a live invocation handle for the entire lifetime `'a`.
/// 2. No other code reports through the same handle while this value exists,
///    except the engine itself.
#[repr(transparent)]
pub struct RawContext<'a> {
    /// Pointer to the engine-owned context
    ///
    /// # Safety
    ///
    /// The following safety invariants are guaranteed to be upheld as long as
    /// this struct exists:
    ///
    /// 1. The pointer is non-null and points to a live invocation handle.
    /// 2. The pointer will point to the same handle for the entire lifetime of
    ///    this object.
    ptr: NonNull<sqlite3_context>,
    _marker: PhantomData<&'a mut sqlite3_context>,
}

impl<'a> RawContext<'a> {
    /// Wraps a raw invocation handle.
    ///
    /// Returns `None` if `ptr` is null.
    ///
    /// # Safety
    ///
    /// The caller must ensure:
    ///
    /// 1. If `ptr` is non-null, it is the handle the engine passed to the
    ///    currently running function callback (or a handle that is valid for
    ///    the primitives of the table it will be used with).
    /// 2. The returned value does not outlive that callback.
    #[inline]
    pub unsafe fn new(ptr: *mut sqlite3_context) -> Option<Self> {
        let ptr = NonNull::new(ptr)?;
        Some(Self {
            // SAFETY:
            // 1. Non-null was just checked, liveness is guaranteed by the caller
            // 2. We are creating the object here and the field is never reassigned
            ptr,
            _marker: PhantomData,
        })
    }

    /// Returns the raw handle.
    #[inline]
    pub fn as_ptr(&self) -> *mut sqlite3_context {
        self.ptr.as_ptr()
    }
}

impl core::fmt::Debug for RawContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("RawContext").field(&self.ptr).finish()
    }
}
