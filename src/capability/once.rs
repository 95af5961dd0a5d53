#[cfg(feature = "std")]
use std::sync::OnceLock as impl_;

#[cfg(not(feature = "std"))]
use spin::Once as impl_;

/// A write-once cell holding a process-wide `Copy` value.
#[repr(transparent)]
pub(crate) struct ResolveOnce<T: 'static + Copy + Send + Sync>(impl_<T>);

impl<T: 'static + Copy + Send + Sync> ResolveOnce<T> {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self(impl_::new())
    }

    #[inline]
    pub(crate) fn get(&'static self) -> Option<T> {
        self.0.get().copied()
    }

    #[inline]
    pub(crate) fn get_or_init(&'static self, init: impl FnOnce() -> T) -> T {
        #[cfg(not(feature = "std"))]
        let value = self.0.call_once(init);

        #[cfg(feature = "std")]
        let value = self.0.get_or_init(init);

        *value
    }

    /// Stores `value` unless the cell is already set, in which case the value
    /// already stored is returned.
    #[inline]
    pub(crate) fn set(&'static self, value: T) -> Result<(), T> {
        let mut stored = false;
        let current = self.get_or_init(|| {
            stored = true;
            value
        });

        if stored { Ok(()) } else { Err(current) }
    }
}
