//! Errors a function invocation can report in place of a result.

use core::ffi::c_int;

use sqlctx_internals::ffi;

/// An error outcome of one function invocation.
///
/// These are outcomes the function asks the engine to surface to the SQL
/// statement, not failures of this crate. Each variant maps onto exactly one
/// `ResultReporter::report_error*` operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorReport<'a> {
    /// A generic error with a human-readable message. The engine copies it.
    Message(&'a str),
    /// A numeric engine error code, without a message.
    Code(c_int),
    /// The function's own allocation failed.
    OutOfMemory,
    /// The result would exceed the engine's maximum size.
    TooBig,
    /// The reporting API was used outside a valid invocation.
    Misuse,
}

impl ErrorReport<'_> {
    /// The engine error code this report surfaces as.
    ///
    /// A [`ErrorReport::Message`] surfaces as the generic `SQLITE_ERROR`.
    pub const fn code(&self) -> c_int {
        match self {
            ErrorReport::Message(_) => ffi::SQLITE_ERROR as c_int,
            ErrorReport::Code(code) => *code,
            ErrorReport::OutOfMemory => ffi::SQLITE_NOMEM as c_int,
            ErrorReport::TooBig => ffi::SQLITE_TOOBIG as c_int,
            ErrorReport::Misuse => ffi::SQLITE_MISUSE as c_int,
        }
    }
}

impl core::fmt::Display for ErrorReport<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ErrorReport::Message(message) => f.write_str(message),
            ErrorReport::Code(code) => write!(f, "error code {code}"),
            ErrorReport::OutOfMemory => f.write_str("out of memory"),
            ErrorReport::TooBig => f.write_str("string or blob too big"),
            ErrorReport::Misuse => f.write_str("bad parameter or other API misuse"),
        }
    }
}
