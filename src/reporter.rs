//! Reporting the outcome of one function invocation.
//!
//! A [`ResultReporter`] is bound to the engine's per-invocation handle for the
//! duration of a closure and turns one [`ResultValue`] or [`ErrorReport`]
//! into exactly one call against the engine's reporting primitives.
//!
//! # Examples
//!
//! A scalar function callback registered with SQLite:
//!
//! ```
//! use std::ffi::c_int;
//!
//! use sqlctx::{Payload, ResultReporter, ResultValue, ffi};
//!
//! unsafe extern "C" fn greet(
//!     ctx: *mut ffi::sqlite3_context,
//!     _argc: c_int,
//!     _argv: *mut *mut ffi::sqlite3_value,
//! ) {
//!     // SAFETY: `ctx` is the handle SQLite passed to this callback.
//!     unsafe {
//!         ResultReporter::scope(ctx, |reporter| {
//!             reporter.report_value(ResultValue::text(Payload::Borrow("hello")));
//!         });
//!     }
//! }
//! ```

use core::{
    ffi::{c_char, c_int, c_void},
    fmt::Display,
    ptr::NonNull,
};

use sqlctx_internals::{RawContext, ResultVtable, ffi};

use crate::{
    engine::Engine,
    error_report::ErrorReport,
    value::{Payload, ResultValue},
};

/// Reports the result of a single function invocation.
///
/// The reporter never owns the invocation handle and cannot outlive the
/// closure given to [`ResultReporter::scope`]. Reporting calls cannot fail;
/// reporting twice in one invocation leaves the second report in effect, as
/// far as the engine is concerned.
pub struct ResultReporter<'a> {
    ctx: RawContext<'a>,
    engine: Engine,
}

impl ResultReporter<'_> {
    /// Runs `f` with a reporter for `ctx`, using the linked SQLite library
    /// under the process-wide capabilities.
    ///
    /// Returns `None` without calling `f` if `ctx` is null.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `ctx`, if non-null, is the handle SQLite
    /// passed to the function callback that is currently running.
    #[inline]
    pub unsafe fn scope<R>(
        ctx: *mut ffi::sqlite3_context,
        f: impl FnOnce(&mut ResultReporter<'_>) -> R,
    ) -> Option<R> {
        // SAFETY:
        // 1. Guaranteed by the caller
        unsafe { Self::scope_with(ctx, Engine::sqlite(), f) }
    }

    /// Runs `f` with a reporter for `ctx`, using `engine`'s primitives.
    ///
    /// Returns `None` without calling `f` if `ctx` is null.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `ctx`, if non-null, is a live invocation
    /// handle accepted by every primitive of `engine`'s table, and that it
    /// stays live until this function returns.
    pub unsafe fn scope_with<R>(
        ctx: *mut ffi::sqlite3_context,
        engine: Engine,
        f: impl FnOnce(&mut ResultReporter<'_>) -> R,
    ) -> Option<R> {
        // SAFETY:
        // 1. Guaranteed by the caller
        // 2. The context is dropped before this function returns
        let ctx = unsafe { RawContext::new(ctx) }?;
        let mut reporter = ResultReporter { ctx, engine };
        Some(f(&mut reporter))
    }
}

impl ResultReporter<'_> {
    /// The engine this reporter reports to.
    #[inline]
    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// The underlying invocation handle.
    #[inline]
    pub fn as_raw(&self) -> *mut ffi::sqlite3_context {
        self.ctx.as_ptr()
    }

    #[inline]
    fn vtable(&self) -> &'static ResultVtable {
        self.engine.vtable()
    }

    /// Sets the result to SQL `NULL`.
    pub fn report_null(&mut self) {
        // SAFETY: the handle is live for the table (see `scope_with`)
        unsafe { (self.vtable().result_null)(self.as_raw()) }
    }

    /// Reports an error with `message`. The engine copies the message.
    ///
    /// Messages longer than `c_int::MAX` bytes are cut to that length.
    pub fn report_error(&mut self, message: &str) {
        let len = c_int::try_from(message.len()).unwrap_or(c_int::MAX);
        // SAFETY: the handle is live for the table, and `message` is readable
        // for `len` bytes during the call
        unsafe {
            (self.vtable().result_error)(self.as_raw(), message.as_ptr().cast::<c_char>(), len)
        }
    }

    /// Reports an error with the rendered `error` as its message.
    ///
    /// This is a convenience for reporting a `rootcause::Report` or any other
    /// displayable error.
    pub fn report_error_display<E: Display + ?Sized>(&mut self, error: &E) {
        let message = alloc::format!("{error}");
        self.report_error(&message);
    }

    /// Reports an error identified by an engine error code.
    pub fn report_error_code(&mut self, code: c_int) {
        // SAFETY: the handle is live for the table
        unsafe { (self.vtable().result_error_code)(self.as_raw(), code) }
    }

    /// Reports that the function's own allocation failed.
    pub fn report_error_out_of_memory(&mut self) {
        // SAFETY: the handle is live for the table
        unsafe { (self.vtable().result_error_nomem)(self.as_raw()) }
    }

    /// Reports that the result exceeds the engine's maximum size.
    pub fn report_error_too_big(&mut self) {
        // SAFETY: the handle is live for the table
        unsafe { (self.vtable().result_error_toobig)(self.as_raw()) }
    }

    /// Reports API misuse (`SQLITE_MISUSE`).
    pub fn report_error_misuse(&mut self) {
        self.report_error_code(ffi::SQLITE_MISUSE as c_int);
    }

    /// Reports `error` through the matching `report_error*` operation.
    pub fn report_failure(&mut self, error: ErrorReport<'_>) {
        match error {
            ErrorReport::Message(message) => self.report_error(message),
            ErrorReport::Code(code) => self.report_error_code(code),
            ErrorReport::OutOfMemory => self.report_error_out_of_memory(),
            ErrorReport::TooBig => self.report_error_too_big(),
            ErrorReport::Misuse => self.report_error_misuse(),
        }
    }

    /// Reports `value` through the primitive matching its kind.
    ///
    /// Text, blob and zeroblob values use the wide primitives whenever the
    /// engine's capabilities say they exist, whatever the length. Otherwise
    /// the classic primitives are used and lengths are passed as 32-bit
    /// values; a text or blob longer than that is reported as
    /// [`ErrorReport::TooBig`], since the classic primitive would read past
    /// the payload.
    ///
    /// [`Payload::Copy`] contents are copied before this returns.
    /// [`Payload::Borrow`] contents are handed over in place and may be read
    /// by the engine until the result has been consumed.
    pub fn report_value(&mut self, value: ResultValue<'_>) {
        let wide = self.engine.capabilities().wide_text;
        tracing::trace!(kind = value.kind(), wide, "reporting result");

        match value {
            ResultValue::Null | ResultValue::Text(None) | ResultValue::Blob(None) => {
                self.report_null();
            }
            ResultValue::Int32(value) => {
                // SAFETY: the handle is live for the table
                unsafe { (self.vtable().result_int)(self.as_raw(), value) }
            }
            ResultValue::Int64(value) => {
                // SAFETY: the handle is live for the table
                unsafe { (self.vtable().result_int64)(self.as_raw(), value) }
            }
            ResultValue::Float64(value) => {
                // SAFETY: the handle is live for the table
                unsafe { (self.vtable().result_double)(self.as_raw(), value) }
            }
            ResultValue::Text(Some(text)) => self.report_text(text, wide),
            ResultValue::Blob(Some(blob)) => self.report_blob(blob, wide),
            ResultValue::ZeroBlob(len) => self.report_zeroblob(len, wide),
        }
    }

    fn report_text(&mut self, payload: Payload<'_, str>, wide: bool) {
        let text = payload.get();
        let ptr = text.as_ptr().cast::<c_char>();
        // `Borrow` payloads are `'static`, so the engine may keep reading
        // them after this call returns.
        let destructor = ResultVtable::destructor(payload.ownership().is_copy());

        match (wide, self.vtable().result_text64) {
            (true, Some(text64)) => {
                // SAFETY: the handle is live for the table, and `text` stays
                // readable for as long as `destructor` promises
                unsafe {
                    text64(
                        self.as_raw(),
                        ptr,
                        text.len() as u64,
                        destructor,
                        ResultVtable::UTF8,
                    );
                }
            }
            _ => {
                let Some(len) = classic_len(text.len()) else {
                    self.report_error_too_big();
                    return;
                };
                // SAFETY: the handle is live for the table, and `text` stays
                // readable for `len` bytes as long as `destructor` promises
                unsafe { (self.vtable().result_text)(self.as_raw(), ptr, len, destructor) }
            }
        }
    }

    fn report_blob(&mut self, payload: Payload<'_, [u8]>, wide: bool) {
        let blob = payload.get();
        let ptr = blob.as_ptr().cast::<c_void>();
        let destructor = ResultVtable::destructor(payload.ownership().is_copy());

        match (wide, self.vtable().result_blob64) {
            (true, Some(blob64)) => {
                // SAFETY: the handle is live for the table, and `blob` stays
                // readable for as long as `destructor` promises
                unsafe { blob64(self.as_raw(), ptr, blob.len() as u64, destructor) }
            }
            _ => {
                let Some(len) = classic_len(blob.len()) else {
                    self.report_error_too_big();
                    return;
                };
                // SAFETY: the handle is live for the table, and `blob` stays
                // readable for `len` bytes as long as `destructor` promises
                unsafe { (self.vtable().result_blob)(self.as_raw(), ptr, len, destructor) }
            }
        }
    }

    fn report_zeroblob(&mut self, len: u64, wide: bool) {
        match (wide, self.vtable().result_zeroblob64) {
            (true, Some(zeroblob64)) => {
                // The engine reports its own error into the context when the
                // length is over its limit; the status adds nothing.
                // SAFETY: the handle is live for the table
                let _status = unsafe { zeroblob64(self.as_raw(), len) };
            }
            _ => {
                // SAFETY: the handle is live for the table
                unsafe { (self.vtable().result_zeroblob)(self.as_raw(), len as c_int) }
            }
        }
    }

    /// Returns the scratch block of the aggregate group being processed.
    ///
    /// The engine allocates and zeroes `bytes` bytes on the first call within
    /// a group and returns the same block on later calls within that group,
    /// until the group is finalized. Returns `None` when the engine could not
    /// allocate, or when `bytes` is zero and nothing was allocated yet.
    ///
    /// Only meaningful inside an aggregate step or finalize callback. What
    /// happens in a scalar callback is up to the engine.
    pub fn scratch_memory(&mut self, bytes: usize) -> Option<NonNull<c_void>> {
        let vtable = self.vtable();
        let wide = self.engine.capabilities().wide_aggregate_context;

        let ptr = match (wide, vtable.aggregate_context64) {
            (true, Some(aggregate_context64)) => {
                // SAFETY: the handle is live for the table
                unsafe { aggregate_context64(self.as_raw(), bytes as u64) }
            }
            _ => {
                // Requests past the classic range cannot be met in full.
                let bytes = classic_len(bytes).unwrap_or(c_int::MAX);
                // SAFETY: the handle is live for the table
                unsafe { (vtable.aggregate_context)(self.as_raw(), bytes) }
            }
        };
        NonNull::new(ptr)
    }
}

/// A length the classic primitives can describe, if there is one.
#[inline]
fn classic_len(len: usize) -> Option<c_int> {
    c_int::try_from(len).ok()
}

impl core::fmt::Debug for ResultReporter<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResultReporter")
            .field("ctx", &self.ctx)
            .field("engine", &self.engine)
            .finish()
    }
}
