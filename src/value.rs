//! Values a function invocation can report as its result.
//!
//! [`ResultValue`] is a closed set of variants, one per kind of engine
//! reporting primitive. Text and blob contents are wrapped in a [`Payload`]
//! that states whether the engine must copy them. There is deliberately no
//! conversion from `&str` or `&[u8]` that picks one for you.
//!
//! # Examples
//!
//! ```
//! use sqlctx::{Payload, ResultValue};
//!
//! let count = ResultValue::from(42_i64);
//! let greeting = ResultValue::text(Payload::Borrow("hello"));
//! let missing = ResultValue::from(None::<f64>);
//!
//! assert_eq!(count, ResultValue::Int64(42));
//! assert_eq!(greeting, ResultValue::Text(Some(Payload::Borrow("hello"))));
//! assert_eq!(missing, ResultValue::Null);
//! ```

use core::fmt;

/// Whether the engine must duplicate a text or blob payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// The engine copies the payload before the reporting call returns. The
    /// caller may free or mutate its buffer right after.
    Copy,
    /// The engine references the caller's buffer without copying it, for as
    /// long as it needs the result. With SQLite that is past the end of the
    /// callback, until the row has been read or the statement reset.
    Borrow,
}

impl Ownership {
    /// Returns `true` for [`Ownership::Copy`].
    #[inline]
    pub const fn is_copy(self) -> bool {
        matches!(self, Ownership::Copy)
    }
}

/// Text or blob contents together with their [`Ownership`].
///
/// A borrowed payload is referenced by the engine after the reporting call
/// returns, so it has to live for the rest of the program:
///
/// ```compile_fail
/// use sqlctx::Payload;
///
/// let buffer = String::from("short lived");
/// // This won't compile because `buffer` is not `'static`
/// let payload: Payload<'_, str> = Payload::Borrow(buffer.as_str());
/// ```
///
/// Use [`Payload::Copy`] for anything built during the invocation:
///
/// ```
/// use sqlctx::{Ownership, Payload};
///
/// let buffer = String::from("short lived");
/// let payload = Payload::Copy(buffer.as_str());
/// assert_eq!(payload.ownership(), Ownership::Copy);
/// ```
pub enum Payload<'a, T: ?Sized + 'static> {
    /// The engine copies the contents during the reporting call.
    Copy(&'a T),
    /// The engine uses the contents in place.
    Borrow(&'static T),
}

impl<'a, T: ?Sized + 'static> Payload<'a, T> {
    /// The contents.
    #[inline]
    pub const fn get(&self) -> &'a T {
        match *self {
            Payload::Copy(value) => value,
            Payload::Borrow(value) => value,
        }
    }

    /// How the engine treats the contents.
    #[inline]
    pub const fn ownership(&self) -> Ownership {
        match self {
            Payload::Copy(_) => Ownership::Copy,
            Payload::Borrow(_) => Ownership::Borrow,
        }
    }
}

impl<T: ?Sized + 'static> Clone for Payload<'_, T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ?Sized + 'static> Copy for Payload<'_, T> {}

impl<T: ?Sized + PartialEq + 'static> PartialEq for Payload<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.ownership() == other.ownership() && self.get() == other.get()
    }
}

impl<T: ?Sized + fmt::Debug + 'static> fmt::Debug for Payload<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Copy(value) => f.debug_tuple("Copy").field(value).finish(),
            Payload::Borrow(value) => f.debug_tuple("Borrow").field(value).finish(),
        }
    }
}

/// A typed result of one function invocation.
///
/// A `None` payload in [`ResultValue::Text`] or [`ResultValue::Blob`] is
/// reported as SQL `NULL`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResultValue<'a> {
    /// SQL `NULL`.
    Null,
    /// A 32-bit integer.
    Int32(i32),
    /// A 64-bit integer.
    Int64(i64),
    /// A double precision float.
    Float64(f64),
    /// UTF-8 text.
    Text(Option<Payload<'a, str>>),
    /// Binary data.
    Blob(Option<Payload<'a, [u8]>>),
    /// A blob of the given number of zero bytes, allocated by the engine.
    ZeroBlob(u64),
}

impl<'a> ResultValue<'a> {
    /// A text result.
    #[inline]
    pub const fn text(payload: Payload<'a, str>) -> Self {
        ResultValue::Text(Some(payload))
    }

    /// A blob result.
    #[inline]
    pub const fn blob(payload: Payload<'a, [u8]>) -> Self {
        ResultValue::Blob(Some(payload))
    }

    /// A zero-filled blob of `len` bytes.
    #[inline]
    pub const fn zeroblob(len: u64) -> Self {
        ResultValue::ZeroBlob(len)
    }

    /// Returns `true` if reporting this value sets the result to SQL `NULL`.
    ///
    /// This includes text and blob values without a payload.
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(
            self,
            ResultValue::Null | ResultValue::Text(None) | ResultValue::Blob(None)
        )
    }

    /// Name of the variant, for diagnostics.
    pub const fn kind(&self) -> &'static str {
        match self {
            ResultValue::Null => "null",
            ResultValue::Int32(_) => "int32",
            ResultValue::Int64(_) => "int64",
            ResultValue::Float64(_) => "float64",
            ResultValue::Text(_) => "text",
            ResultValue::Blob(_) => "blob",
            ResultValue::ZeroBlob(_) => "zeroblob",
        }
    }
}

impl From<i32> for ResultValue<'_> {
    #[inline]
    fn from(value: i32) -> Self {
        ResultValue::Int32(value)
    }
}

impl From<i64> for ResultValue<'_> {
    #[inline]
    fn from(value: i64) -> Self {
        ResultValue::Int64(value)
    }
}

impl From<f64> for ResultValue<'_> {
    #[inline]
    fn from(value: f64) -> Self {
        ResultValue::Float64(value)
    }
}

impl<'a> From<Payload<'a, str>> for ResultValue<'a> {
    #[inline]
    fn from(payload: Payload<'a, str>) -> Self {
        ResultValue::text(payload)
    }
}

impl<'a> From<Payload<'a, [u8]>> for ResultValue<'a> {
    #[inline]
    fn from(payload: Payload<'a, [u8]>) -> Self {
        ResultValue::blob(payload)
    }
}

impl<'a, V> From<Option<V>> for ResultValue<'a>
where
    V: Into<ResultValue<'a>>,
{
    #[inline]
    fn from(value: Option<V>) -> Self {
        match value {
            Some(value) => value.into(),
            None => ResultValue::Null,
        }
    }
}
