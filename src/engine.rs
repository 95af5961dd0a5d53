//! Pairing of a reporting table with the capabilities it is used under.

use rootcause::{Report, report};
use sqlctx_internals::ResultVtable;

use crate::capability::{Capabilities, CapabilityError};

/// A reporting table together with the capabilities that decide which of its
/// primitives are used.
///
/// An [`Engine`] only exists when its table provides every primitive its
/// capabilities claim. After that, the choice between classic and wide
/// primitives depends on the capabilities alone.
#[derive(Clone, Copy)]
pub struct Engine {
    vtable: &'static ResultVtable,
    capabilities: Capabilities,
}

impl Engine {
    /// Pairs `vtable` with `capabilities`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::Unsupported`] when a capability is claimed
    /// but the table lacks the primitive it needs.
    pub fn new(
        vtable: &'static ResultVtable,
        capabilities: Capabilities,
    ) -> Result<Self, Report<CapabilityError>> {
        if let Some(missing) = missing_primitive(vtable, capabilities) {
            tracing::warn!(missing, %capabilities, "capability claim rejected");
            return Err(report!(CapabilityError::Unsupported { missing }).attach(capabilities));
        }

        Ok(Self {
            vtable,
            capabilities,
        })
    }

    /// The linked SQLite library under the process-wide capabilities.
    ///
    /// The first call resolves [`Capabilities::current`].
    pub fn sqlite() -> Self {
        Self {
            // Every capability accepted into the process-wide value was
            // checked against this table by `Capabilities::install`, and
            // detection never claims more than SQLite provides.
            vtable: ResultVtable::sqlite(),
            capabilities: Capabilities::current(),
        }
    }

    /// The reporting table.
    #[inline]
    pub fn vtable(&self) -> &'static ResultVtable {
        self.vtable
    }

    /// The capabilities in effect.
    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}

fn missing_primitive(vtable: &ResultVtable, capabilities: Capabilities) -> Option<&'static str> {
    if capabilities.wide_text {
        if vtable.result_text64.is_none() {
            return Some("result_text64");
        }
        if vtable.result_blob64.is_none() {
            return Some("result_blob64");
        }
        if vtable.result_zeroblob64.is_none() {
            return Some("result_zeroblob64");
        }
    }
    if capabilities.wide_aggregate_context && vtable.aggregate_context64.is_none() {
        return Some("aggregate_context64");
    }
    None
}

impl core::fmt::Debug for Engine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Engine")
            .field("vtable", self.vtable)
            .field("capabilities", &self.capabilities)
            .finish()
    }
}
