#![cfg_attr(not(doc), no_std)]
#![deny(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    clippy::as_ptr_cast_mut,
    clippy::ptr_as_ptr,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    missing_copy_implementations,
    unused_doc_comments
)]
// Make docs.rs generate better docs
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Typed result and error reporting for SQLite user-defined functions.
//!
//! ## Overview
//!
//! When a scalar or aggregate function registered with SQLite finishes one
//! invocation, it has to hand its outcome back through the `sqlite3_context`
//! the engine passed in. SQLite offers a different primitive for every kind of
//! value, a choice of copy semantics for text and blobs, 64-bit length
//! variants that only newer libraries have, and several ways to signal an
//! error. This crate wraps all of that behind one small type,
//! [`ResultReporter`].
//!
//! ## Quick Example
//!
//! ```
//! use std::ffi::c_int;
//!
//! use sqlctx::{ErrorReport, ResultReporter, ResultValue, ffi};
//!
//! unsafe extern "C" fn half(
//!     ctx: *mut ffi::sqlite3_context,
//!     _argc: c_int,
//!     _argv: *mut *mut ffi::sqlite3_value,
//! ) {
//!     let input: i64 = 42; // decoded from `_argv` in a real function
//!
//!     // SAFETY: `ctx` is the handle SQLite passed to this callback.
//!     unsafe {
//!         ResultReporter::scope(ctx, |reporter| {
//!             if input % 2 == 0 {
//!                 reporter.report_value(ResultValue::from(input / 2));
//!             } else {
//!                 reporter.report_failure(ErrorReport::Message("odd input"));
//!             }
//!         });
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! - **[`ResultValue`]**: the closed set of things a function can return:
//!   `NULL`, 32 and 64-bit integers, doubles, text, blobs and zero-filled
//!   blobs. Text and blobs come as a [`Payload`] that says whether SQLite
//!   must copy them; only `'static` contents can be handed over without a
//!   copy. A text or blob without a payload is reported as `NULL`.
//! - **[`ErrorReport`]**: the five ways to fail: a message, an error code,
//!   out of memory, too big and misuse.
//! - **[`Capabilities`]**: whether the linked library has the 64-bit length
//!   primitives. Resolved once per process and read-only afterwards. When
//!   they exist they are always used, whatever the payload size.
//! - **[`Engine`]**: a table of primitives paired with the capabilities it is
//!   used under. [`Engine::sqlite`] is what [`ResultReporter::scope`] uses;
//!   other tables can be plugged in with [`ResultReporter::scope_with`].
//!
//! For the raw boundary, see the [`sqlctx-internals`] crate.
//!
//! [`sqlctx-internals`]: sqlctx_internals
//!
//! ## Features
//!
//! - `bundled` (default): compile SQLite from source through
//!   `libsqlite3-sys`.
//! - `std`: use `std::sync::OnceLock` for the process-wide capabilities and
//!   honour the `SQLCTX_CAPABILITIES` environment variable (see
//!   [`capability`]).
//!
//! ## Logging
//!
//! Capability resolution and rejected capability claims are logged with
//! [`tracing`] at `debug` and `warn` level; every reported value is logged at
//! `trace` level.
//!
//! [`tracing`]: https://docs.rs/tracing

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod capability;
mod engine;
mod error_report;
pub mod prelude;
mod reporter;
mod value;

pub use sqlctx_internals::{ResultVtable, ffi};

pub use self::{
    capability::{Capabilities, CapabilityError},
    engine::Engine,
    error_report::ErrorReport,
    reporter::ResultReporter,
    value::{Ownership, Payload, ResultValue},
};
