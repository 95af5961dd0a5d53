#![no_std]
#![forbid(
    missing_docs,
    clippy::alloc_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::std_instead_of_core,
    clippy::missing_safety_doc,
    clippy::undocumented_unsafe_blocks,
    clippy::multiple_unsafe_ops_per_block,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::broken_intra_doc_links,
    unused_doc_comments
)]
#![allow(rustdoc::private_intra_doc_links)]
//! Internal implementation crate for [`sqlctx`].
//!
//! # Overview
//!
//! This crate holds the raw boundary between `sqlctx` and the engine that
//! invokes user-defined functions: the invocation handle and the table of
//! reporting primitives the engine exposes. Nothing here decides *which*
//! primitive to call; that is the job of `sqlctx::ResultReporter`.
//!
//! **This crate is an implementation detail.** No semantic versioning
//! guarantees are provided. Users should depend on the [`sqlctx`] crate, not
//! this one.
//!
//! # Architecture
//!
//! - [`RawContext`]: a non-null, lifetime-bound, non-owning pointer to the
//!   engine's per-invocation `sqlite3_context`. It cannot be copied, sent or
//!   shared, and never frees what it points to.
//! - [`ResultVtable`]: function pointers for every reporting primitive. The
//!   wide (64-bit length) entries are optional so that tables for engines
//!   lacking them can still be described. [`ResultVtable::sqlite`] returns
//!   the table for the linked SQLite library.
//! - [`libversion_number`]: the linked library's version, used to resolve
//!   capabilities once per process.
//!
//! # Safety Strategy
//!
//! Every primitive in a [`ResultVtable`] is an `unsafe extern "C"` function
//! that requires a live invocation handle. [`RawContext::new`] is the single
//! place where that obligation is taken on: the caller promises the pointer
//! is a valid handle for the chosen table for the lifetime `'a`. Code holding
//! a [`RawContext`] can then call the primitives while that lifetime lasts.
//!
//! [`sqlctx`]: https://docs.rs/sqlctx/latest/sqlctx/

mod context;
mod vtable;

pub use libsqlite3_sys as ffi;

pub use context::RawContext;
pub use vtable::{
    AggregateContext64Fn, AggregateContextFn, Blob64Fn, BlobFn, DoubleFn, ErrorFn, Int64Fn,
    IntFn, ResultVtable, Text64Fn, TextFn, UnitFn, ZeroBlob64Fn,
};

/// Returns the version number of the linked SQLite library, in the
/// `X*1000000 + Y*1000 + Z` form used by `SQLITE_VERSION_NUMBER`.
#[inline]
pub fn libversion_number() -> i32 {
    // SAFETY: `sqlite3_libversion_number` takes no arguments, touches no
    // shared state and may be called at any time, even before
    // `sqlite3_initialize`.
    unsafe { ffi::sqlite3_libversion_number() }
}
