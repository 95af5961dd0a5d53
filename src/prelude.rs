//! Commonly used items for convenient importing.
//!
//! # Usage
//!
//! ```rust
//! use sqlctx::prelude::*;
//!
//! fn outcome(input: Option<&str>) -> ResultValue<'_> {
//!     ResultValue::Text(input.map(Payload::Copy))
//! }
//!
//! assert!(outcome(None).is_null());
//! ```

pub use crate::{ErrorReport, Ownership, Payload, ResultReporter, ResultValue};
