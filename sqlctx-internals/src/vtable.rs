//! Table of engine reporting primitives.
//!
//! A [`ResultVtable`] describes the outbound half of the function-callback
//! API of an engine: one entry per `sqlite3_result_*` style primitive plus
//! the aggregate-context allocator. The table for the linked SQLite library
//! is available through [`ResultVtable::sqlite`]; tests and hosts that route
//! calls elsewhere build their own.
//!
//! # Wide entries
//!
//! `result_text64`, `result_blob64`, `result_zeroblob64` and
//! `aggregate_context64` are optional. An engine that predates the 64-bit
//! interfaces leaves them as `None`. Whether a present entry is actually used
//! is decided from the capabilities the table is paired with, never from the
//! payload size.

use core::ffi::{c_char, c_int, c_uchar, c_void};

use crate::ffi::{self, sqlite3_context, sqlite3_destructor_type};

/// `sqlite3_result_null`, `sqlite3_result_error_nomem`,
/// `sqlite3_result_error_toobig`.
pub type UnitFn = unsafe extern "C" fn(*mut sqlite3_context);
/// `sqlite3_result_int`, `sqlite3_result_error_code`,
/// `sqlite3_result_zeroblob`.
pub type IntFn = unsafe extern "C" fn(*mut sqlite3_context, c_int);
/// `sqlite3_result_int64`.
pub type Int64Fn = unsafe extern "C" fn(*mut sqlite3_context, i64);
/// `sqlite3_result_double`.
pub type DoubleFn = unsafe extern "C" fn(*mut sqlite3_context, f64);
/// `sqlite3_result_text`.
pub type TextFn =
    unsafe extern "C" fn(*mut sqlite3_context, *const c_char, c_int, sqlite3_destructor_type);
/// `sqlite3_result_text64`. The last argument is the text encoding.
pub type Text64Fn = unsafe extern "C" fn(
    *mut sqlite3_context,
    *const c_char,
    u64,
    sqlite3_destructor_type,
    c_uchar,
);
/// `sqlite3_result_blob`.
pub type BlobFn =
    unsafe extern "C" fn(*mut sqlite3_context, *const c_void, c_int, sqlite3_destructor_type);
/// `sqlite3_result_blob64`.
pub type Blob64Fn =
    unsafe extern "C" fn(*mut sqlite3_context, *const c_void, u64, sqlite3_destructor_type);
/// `sqlite3_result_zeroblob64`. Returns an engine status code.
pub type ZeroBlob64Fn = unsafe extern "C" fn(*mut sqlite3_context, u64) -> c_int;
/// `sqlite3_result_error`. The engine copies the message.
pub type ErrorFn = unsafe extern "C" fn(*mut sqlite3_context, *const c_char, c_int);
/// `sqlite3_aggregate_context`.
pub type AggregateContextFn = unsafe extern "C" fn(*mut sqlite3_context, c_int) -> *mut c_void;
/// A 64-bit sized aggregate-context allocator.
pub type AggregateContext64Fn = unsafe extern "C" fn(*mut sqlite3_context, u64) -> *mut c_void;

/// Function pointers for every reporting primitive of an engine.
///
/// All entries must accept the invocation handles the engine hands to
/// function callbacks. Every entry is `unsafe` to call: the handle must be
/// live, which is what a [`RawContext`](crate::RawContext) vouches for.
#[derive(Clone, Copy)]
pub struct ResultVtable {
    /// Sets the result to SQL `NULL`.
    pub result_null: UnitFn,
    /// Sets a 32-bit integer result.
    pub result_int: IntFn,
    /// Sets a 64-bit integer result.
    pub result_int64: Int64Fn,
    /// Sets a floating point result.
    pub result_double: DoubleFn,
    /// Sets a UTF-8 text result with a 32-bit length.
    pub result_text: TextFn,
    /// Sets a text result with a 64-bit length.
    pub result_text64: Option<Text64Fn>,
    /// Sets a blob result with a 32-bit length.
    pub result_blob: BlobFn,
    /// Sets a blob result with a 64-bit length.
    pub result_blob64: Option<Blob64Fn>,
    /// Sets a zero-filled blob result with a 32-bit length.
    pub result_zeroblob: IntFn,
    /// Sets a zero-filled blob result with a 64-bit length.
    pub result_zeroblob64: Option<ZeroBlob64Fn>,
    /// Reports an error with a message.
    pub result_error: ErrorFn,
    /// Reports an error code.
    pub result_error_code: IntFn,
    /// Reports the engine's "out of memory" error.
    pub result_error_nomem: UnitFn,
    /// Reports the engine's "string or blob too big" error.
    pub result_error_toobig: UnitFn,
    /// Returns the aggregate-group scratch block, allocating it on first use.
    pub aggregate_context: AggregateContextFn,
    /// 64-bit sized variant of `aggregate_context`.
    pub aggregate_context64: Option<AggregateContext64Fn>,
}

impl ResultVtable {
    /// Returns the table bound to the linked SQLite library.
    ///
    /// SQLite has no 64-bit aggregate-context allocator, so
    /// `aggregate_context64` is `None`.
    pub const fn sqlite() -> &'static Self {
        const {
            &Self {
                result_null: ffi::sqlite3_result_null,
                result_int: ffi::sqlite3_result_int,
                result_int64: ffi::sqlite3_result_int64,
                result_double: ffi::sqlite3_result_double,
                result_text: ffi::sqlite3_result_text,
                result_text64: Some(ffi::sqlite3_result_text64),
                result_blob: ffi::sqlite3_result_blob,
                result_blob64: Some(ffi::sqlite3_result_blob64),
                result_zeroblob: ffi::sqlite3_result_zeroblob,
                result_zeroblob64: Some(ffi::sqlite3_result_zeroblob64),
                result_error: ffi::sqlite3_result_error,
                result_error_code: ffi::sqlite3_result_error_code,
                result_error_nomem: ffi::sqlite3_result_error_nomem,
                result_error_toobig: ffi::sqlite3_result_error_toobig,
                aggregate_context: ffi::sqlite3_aggregate_context,
                aggregate_context64: None,
            }
        }
    }

    /// Whether all three 64-bit text, blob and zeroblob entries are present.
    #[inline]
    pub const fn has_wide_text(&self) -> bool {
        self.result_text64.is_some()
            && self.result_blob64.is_some()
            && self.result_zeroblob64.is_some()
    }

    /// Whether the 64-bit aggregate-context entry is present.
    #[inline]
    pub const fn has_wide_aggregate_context(&self) -> bool {
        self.aggregate_context64.is_some()
    }

    /// The destructor argument asking the engine to copy a payload before
    /// the primitive returns (`SQLITE_TRANSIENT`), or to use it in place for
    /// the duration of the call (`SQLITE_STATIC`).
    #[inline]
    pub fn destructor(copy: bool) -> sqlite3_destructor_type {
        if copy {
            ffi::SQLITE_TRANSIENT()
        } else {
            ffi::SQLITE_STATIC()
        }
    }

    /// The encoding argument passed to `result_text64`.
    pub const UTF8: c_uchar = ffi::SQLITE_UTF8 as c_uchar;
}

impl core::fmt::Debug for ResultVtable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResultVtable")
            .field("has_wide_text", &self.has_wide_text())
            .field(
                "has_wide_aggregate_context",
                &self.has_wide_aggregate_context(),
            )
            .finish_non_exhaustive()
    }
}
