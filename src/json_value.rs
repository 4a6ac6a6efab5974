use core::fmt;

use serde::Serialize;

use crate::escaping_writer::EscapingWriter;
use crate::log_error::LogError;

/// Implemented by values that render their own JSON.
///
/// The implementation is in full control of the JSON it produces: call
/// [`EscapingWriter::write_json_string`] for a complete string value,
/// [`EscapingWriter::write_escaped`] for string content assembled over
/// several calls, or [`EscapingWriter::write_raw`] for numbers, booleans and
/// structural characters.
pub trait JsonWritable {
    /// Writes this value's JSON representation and returns the bytes emitted.
    ///
    /// # Errors
    /// Propagates [`LogError::Sink`] from the writer, or returns
    /// [`LogError::Encode`] if the value cannot be rendered.
    fn write_json(&self, w: &mut EscapingWriter<'_>) -> Result<usize, LogError>;
}

/// A record field value, dispatched as a closed set of variants.
///
/// Variant order mirrors encoding cost: borrowed strings and scalars are
/// allocation-free; [`Value::Display`] streams through the escaping buffer
/// without allocating; [`Value::Json`] is the generic fallback and the only
/// path permitted to allocate or fail. Scalars and borrowed references convert
/// via `From`, so call sites stay terse: `Value::from(42)`,
/// `Value::from("text")`.
pub enum Value<'a> {
    /// A borrowed string, written as a quoted escaped JSON string.
    Str(&'a str),
    /// Signed integer, written as decimal ASCII.
    I64(i64),
    /// Unsigned integer, written as decimal ASCII.
    U64(u64),
    /// 32-bit float, written fixed-point with exactly six fractional digits.
    F32(f32),
    /// 64-bit float, written fixed-point with exactly six fractional digits.
    F64(f64),
    /// Boolean, written as the literal `true` or `false`.
    Bool(bool),
    /// Absent value, written as the literal `null`.
    Null,
    /// A string-like value rendered through its `Display` impl, quoted and
    /// escaped, streamed without allocation.
    Display(&'a dyn fmt::Display),
    /// A value that writes its own JSON; see [`JsonWritable`].
    Writable(&'a dyn JsonWritable),
    /// Pre-serialized generic fallback, produced by [`Value::json`].
    Json(serde_json::Value),
}

impl<'a> Value<'a> {
    /// Wraps a string-like value; it is rendered via `Display`, escaped, and
    /// quoted at encode time.
    #[must_use]
    pub fn display(v: &'a dyn fmt::Display) -> Self {
        Value::Display(v)
    }

    /// Wraps a value that renders its own JSON.
    #[must_use]
    pub fn writable(v: &'a dyn JsonWritable) -> Self {
        Value::Writable(v)
    }

    /// Generic fallback for types without a dedicated variant: serializes `v`
    /// to a JSON tree now, to be streamed out at encode time.
    ///
    /// # Errors
    /// Returns [`LogError::Encode`] when `v` cannot be serialized; the caller
    /// decides whether that aborts the record.
    pub fn json<T: Serialize>(v: &T) -> Result<Value<'static>, LogError> {
        Ok(Value::Json(serde_json::to_value(v)?))
    }
}

macro_rules! value_from_int {
    ($variant:ident, $via:ty, $($ty:ty),+) => {$(
        impl From<$ty> for Value<'_> {
            fn from(v: $ty) -> Self {
                Value::$variant(v as $via)
            }
        }
    )+};
}

value_from_int!(I64, i64, i8, i16, i32, isize);
value_from_int!(U64, u64, u8, u16, u32, usize);

impl From<i64> for Value<'_> {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<u64> for Value<'_> {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(v: &'a str) -> Self {
        Value::Str(v)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(v: &'a String) -> Self {
        Value::Str(v)
    }
}

impl From<f32> for Value<'_> {
    fn from(v: f32) -> Self {
        Value::F32(v)
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<'a, T> From<Option<T>> for Value<'a>
where
    T: Into<Value<'a>>,
{
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A record field key.
///
/// Keys are strings in well-formed records; anything else is rendered through
/// the [`Key::Invalid`] placeholder so the emitted line stays valid JSON and
/// the mistake is visible in the output.
pub enum Key<'a> {
    /// A borrowed string key.
    Str(&'a str),
    /// A string-like key, rendered via `Display`.
    Display(&'a dyn fmt::Display),
    /// A non-string key; encodes as `"INVALID_KEY_<debug-rendering>"`.
    Invalid(&'a dyn fmt::Debug),
}

impl<'a> Key<'a> {
    /// Wraps a string-like key.
    #[must_use]
    pub fn display(v: &'a dyn fmt::Display) -> Self {
        Key::Display(v)
    }

    /// Marks a key of a non-string type; it will be emitted under the
    /// `INVALID_KEY_` placeholder.
    #[must_use]
    pub fn invalid(v: &'a dyn fmt::Debug) -> Self {
        Key::Invalid(v)
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(v: &'a str) -> Self {
        Key::Str(v)
    }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(v: &'a String) -> Self {
        Key::Str(v)
    }
}
