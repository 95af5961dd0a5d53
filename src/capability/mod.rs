//! Engine capabilities and their process-wide resolution.
//!
//! Whether the engine offers the wide (64-bit length) reporting primitives is
//! a fact about the linked library, not about any one invocation. It is
//! resolved once, the first time [`Capabilities::current`] is called, and is
//! read-only afterwards.
//!
//! # Resolution order
//!
//! 1. A value installed with [`Capabilities::install`] before first use.
//! 2. With the `std` feature, the `SQLCTX_CAPABILITIES` environment variable.
//!    It holds comma-separated options:
//!    - `classic` - Never use the wide primitives.
//!
//!    Unknown options are ignored with a warning.
//! 3. The version of the linked library, see
//!    [`Capabilities::from_version_number`].
//!
//! # Examples
//!
//! ```
//! use sqlctx::Capabilities;
//!
//! // Pin classic reporting for the whole process before any function runs.
//! Capabilities::classic()
//!     .install()
//!     .expect("nothing resolved the capabilities yet");
//!
//! assert_eq!(Capabilities::current(), Capabilities::classic());
//! ```

mod once;

use rootcause::{Report, report};
use sqlctx_internals::ResultVtable;

use self::once::ResolveOnce;
use crate::engine::Engine;

static RESOLVED: ResolveOnce<Capabilities> = ResolveOnce::new();

/// Which optional reporting primitives an engine supports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Capabilities {
    /// Text, blob and zeroblob results go through the 64-bit length
    /// primitives.
    pub wide_text: bool,
    /// Scratch memory is requested through the 64-bit sized allocator.
    pub wide_aggregate_context: bool,
}

impl Capabilities {
    /// First SQLite release with `sqlite3_result_text64`,
    /// `sqlite3_result_blob64` and `sqlite3_result_zeroblob64` all available
    /// (3.8.11).
    pub const WIDE_TEXT_MIN_VERSION: i32 = 3_008_011;

    /// Only the classic primitives.
    #[inline]
    pub const fn classic() -> Self {
        Self {
            wide_text: false,
            wide_aggregate_context: false,
        }
    }

    /// Every wide primitive.
    #[inline]
    pub const fn wide() -> Self {
        Self {
            wide_text: true,
            wide_aggregate_context: true,
        }
    }

    /// Capabilities of a SQLite library with the given version number.
    ///
    /// SQLite has no 64-bit aggregate-context allocator in any version, so
    /// `wide_aggregate_context` is always `false`.
    pub const fn from_version_number(version: i32) -> Self {
        Self {
            wide_text: version >= Self::WIDE_TEXT_MIN_VERSION,
            wide_aggregate_context: false,
        }
    }

    /// Inspects the linked SQLite library.
    ///
    /// This does not consult or change the process-wide value.
    pub fn detect() -> Self {
        let version = sqlctx_internals::libversion_number();
        let detected = Self::from_version_number(version);

        #[cfg(feature = "std")]
        let detected = env::apply(detected);

        tracing::debug!(
            version,
            wide_text = detected.wide_text,
            wide_aggregate_context = detected.wide_aggregate_context,
            "detected engine capabilities"
        );
        detected
    }

    /// The process-wide capabilities, resolving them on first use.
    pub fn current() -> Self {
        RESOLVED.get_or_init(Self::detect)
    }

    /// The process-wide capabilities if they have been resolved already.
    pub fn resolved() -> Option<Self> {
        RESOLVED.get()
    }

    /// Pins the process-wide capabilities.
    ///
    /// Must run before anything calls [`Capabilities::current`], typically
    /// while the host program starts up.
    ///
    /// # Errors
    ///
    /// - [`CapabilityError::Unsupported`] if the linked SQLite library cannot
    ///   honour `self`.
    /// - [`CapabilityError::AlreadyResolved`] if the capabilities were
    ///   installed or detected before.
    pub fn install(self) -> Result<(), Report<CapabilityError>> {
        Engine::new(ResultVtable::sqlite(), self)?;

        match RESOLVED.set(self) {
            Ok(()) => {
                tracing::debug!(
                    wide_text = self.wide_text,
                    wide_aggregate_context = self.wide_aggregate_context,
                    "installed engine capabilities"
                );
                Ok(())
            }
            Err(resolved) => {
                tracing::warn!(requested = %self, %resolved, "engine capabilities already resolved");
                Err(report!(CapabilityError::AlreadyResolved(resolved)).attach(self))
            }
        }
    }
}

impl core::fmt::Display for Capabilities {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let yes_no = |flag: bool| if flag { "yes" } else { "no" };
        write!(
            f,
            "wide text: {}, wide aggregate context: {}",
            yes_no(self.wide_text),
            yes_no(self.wide_aggregate_context)
        )
    }
}

/// A capability claim could not be accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapabilityError {
    /// The process-wide capabilities were resolved before, to this value.
    AlreadyResolved(Capabilities),
    /// The engine's reporting table lacks the named primitive.
    Unsupported {
        /// Name of the missing primitive.
        missing: &'static str,
    },
}

impl core::fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CapabilityError::AlreadyResolved(resolved) => {
                write!(f, "engine capabilities are already resolved ({resolved})")
            }
            CapabilityError::Unsupported { missing } => {
                write!(f, "engine does not provide `{missing}`")
            }
        }
    }
}

impl core::error::Error for CapabilityError {}

#[cfg(feature = "std")]
mod env {
    use super::Capabilities;

    pub(super) const VAR: &str = "SQLCTX_CAPABILITIES";

    pub(super) fn apply(detected: Capabilities) -> Capabilities {
        match std::env::var_os(VAR) {
            Some(var) => parse(detected, &var.to_string_lossy()),
            None => detected,
        }
    }

    /// Applies the comma-separated `options` to `detected`.
    pub(super) fn parse(detected: Capabilities, options: &str) -> Capabilities {
        let mut capabilities = detected;
        for option in options.split(',').map(str::trim) {
            if option.is_empty() {
                continue;
            }
            if option.eq_ignore_ascii_case("classic") {
                capabilities = Capabilities::classic();
            } else {
                tracing::warn!(option, var = VAR, "ignoring unknown capability option");
            }
        }
        capabilities
    }

}
