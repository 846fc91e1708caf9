//! Dynamic value representation for log fields.
//!
//! [`Value`] is the closed set of shapes a field value can take. Most shapes
//! are encoded directly by the fast encoder ([`encode`](crate::encode)); two
//! are deliberately outside that set:
//!
//! - [`Value::Reflect`]: any `Serialize` type (structs, enums, nested
//!   collections of them), encoded through serde by the fallback encoder
//! - [`Value::Unsupported`]: something with no JSON representation at all,
//!   such as a channel handle or a closure; only its description is kept
//!
//! ## Creating Values
//!
//! ```rust
//! use json_logger::{Value, FieldMap};
//! use serde::Serialize;
//!
//! let null = Value::Null;
//! let count = Value::from(42u16);
//! let name = Value::from("alice");
//! let tags = Value::from(vec!["a", "b"]);
//!
//! #[derive(Debug, Serialize)]
//! struct Card { last4: &'static str }
//! let card = Value::reflect(Card { last4: "4242" });
//!
//! assert!(count.is_number());
//! assert!(card.is_reflect());
//! ```

use crate::scalar::{self, Rfc3339Nano};
use crate::FieldMap;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// A dynamically-typed log field value.
///
/// # Examples
///
/// ```rust
/// use json_logger::{Number, Value};
///
/// let value = Value::Number(Number::Int(-3));
/// assert_eq!(value.as_i64(), Some(-3));
/// assert_eq!(value.to_string(), "-3");
/// ```
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// Always rendered in UTC, whatever zone it was created in.
    Timestamp(DateTime<Utc>),
    Array(Vec<Value>),
    Object(FieldMap),
    /// A value encoded through its `Serialize` implementation.
    Reflect(Arc<dyn Reflect>),
    /// A value with no JSON representation; holds a human-readable description.
    Unsupported(String),
}

/// A numeric value. Integer widths collapse to their 64-bit family; floats
/// keep their width so they print with the right number of digits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i64),
    Uint(u64),
    Float32(f32),
    Float64(f64),
}

impl Number {
    /// Returns `true` for the two integer variants.
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Int(_) | Number::Uint(_))
    }

    /// Converts to `i64` when the value is an integer in range.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Number::Int(i) => Some(i),
            Number::Uint(u) => i64::try_from(u).ok(),
            Number::Float32(_) | Number::Float64(_) => None,
        }
    }

    /// Converts to `u64` when the value is a non-negative integer.
    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Number::Int(i) => u64::try_from(i).ok(),
            Number::Uint(u) => Some(u),
            Number::Float32(_) | Number::Float64(_) => None,
        }
    }

    /// Converts to `f64`, possibly losing precision for large integers.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Uint(u) => u as f64,
            Number::Float32(f) => f64::from(f),
            Number::Float64(f) => f,
        }
    }

    /// Appends the JSON text of this number.
    pub(crate) fn write(&self, buf: &mut Vec<u8>) {
        match *self {
            Number::Int(i) => scalar::format_int(buf, i),
            Number::Uint(u) => scalar::format_uint(buf, u),
            Number::Float32(f) => scalar::format_f32(buf, f),
            Number::Float64(f) => scalar::format_f64(buf, f),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::with_capacity(24);
        self.write(&mut buf);
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}

/// A field value handled by the serde-based fallback encoder.
///
/// Implemented for every `Serialize + Debug` type that can be shared across
/// threads; the `Debug` form is what gets logged if serialization fails.
pub trait Reflect: fmt::Debug + Send + Sync {
    /// Appends the JSON encoding of `self` to `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`](crate::Error::UnsupportedType) if
    /// the value contains a shape with no JSON representation.
    fn marshal_json(&self, buf: &mut Vec<u8>) -> crate::Result<()>;

    /// Converts `self` into a [`Value`] tree.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Reflect::marshal_json`].
    fn to_value(&self) -> crate::Result<Value>;
}

impl<T> Reflect for T
where
    T: Serialize + fmt::Debug + Send + Sync,
{
    fn marshal_json(&self, buf: &mut Vec<u8>) -> crate::Result<()> {
        crate::ser::marshal(buf, self)
    }

    fn to_value(&self) -> crate::Result<Value> {
        crate::ser::to_value(self)
    }
}

macro_rules! is_variant {
    ($($(#[$doc:meta])* $name:ident => $pat:pat),* $(,)?) => {
        $(
            $(#[$doc])*
            #[inline]
            #[must_use]
            pub const fn $name(&self) -> bool {
                matches!(self, $pat)
            }
        )*
    };
}

impl Value {
    /// Wraps any serializable value for the fallback encoder.
    pub fn reflect<T>(value: T) -> Self
    where
        T: Serialize + fmt::Debug + Send + Sync + 'static,
    {
        Value::Reflect(Arc::new(value))
    }

    /// Records a value that cannot be represented as JSON.
    ///
    /// The description is what ends up in the log line in its place.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use json_logger::Value;
    ///
    /// let (tx, _rx) = std::sync::mpsc::channel::<u8>();
    /// let value = Value::unsupported(&tx);
    /// assert!(value.is_unsupported());
    /// ```
    pub fn unsupported<T: fmt::Debug + ?Sized>(value: &T) -> Self {
        Value::Unsupported(format!("{:?}", value))
    }

    is_variant! {
        /// Returns `true` if the value is null.
        is_null => Value::Null,
        /// Returns `true` if the value is a boolean.
        is_bool => Value::Bool(_),
        /// Returns `true` if the value is a number.
        is_number => Value::Number(_),
        /// Returns `true` if the value is a string.
        is_string => Value::String(_),
        /// Returns `true` if the value is a timestamp.
        is_timestamp => Value::Timestamp(_),
        /// Returns `true` if the value is an array.
        is_array => Value::Array(_),
        /// Returns `true` if the value is an object.
        is_object => Value::Object(_),
        /// Returns `true` if the value goes through the serde fallback.
        is_reflect => Value::Reflect(_),
        /// Returns `true` if the value has no JSON representation.
        is_unsupported => Value::Unsupported(_),
    }

    /// If the value is a boolean, returns it.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an integer that fits in `i64`, returns it.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// If the value is a non-negative integer, returns it.
    #[inline]
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    /// If the value is a number, returns it as `f64`.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&FieldMap> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_timestamp(&self) -> Option<&DateTime<Utc>> {
        match self {
            Value::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            // Reflected values have no equality of their own; identity is the best we can do.
            (Value::Reflect(a), Value::Reflect(b)) => Arc::ptr_eq(a, b),
            (Value::Unsupported(a), Value::Unsupported(b)) => a == b,
            _ => false,
        }
    }
}

/// Human-readable rendering, used in place of values that cannot be encoded.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Timestamp(ts) => write!(f, "{}", Rfc3339Nano(ts)),
            Value::Array(arr) => {
                f.write_str("[")?;
                for (i, elem) in arr.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", elem)?;
                }
                f.write_str("]")
            }
            Value::Object(obj) => {
                f.write_str("map[")?;
                for (i, (key, value)) in obj.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", key, value)?;
                }
                f.write_str("]")
            }
            Value::Reflect(inner) => write!(f, "{:?}", inner),
            Value::Unsupported(description) => f.write_str(description),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Int(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Uint(u)) => serializer.serialize_u64(*u),
            Value::Number(Number::Float32(f)) => serializer.serialize_f32(*f),
            Value::Number(Number::Float64(f)) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Timestamp(ts) => serializer.collect_str(&Rfc3339Nano(ts)),
            Value::Array(arr) => serializer.collect_seq(arr),
            Value::Object(obj) => serializer.collect_map(obj.iter()),
            Value::Reflect(inner) => inner
                .to_value()
                .map_err(<S::Error as serde::ser::Error>::custom)?
                .serialize(serializer),
            Value::Unsupported(description) => {
                Err(<S::Error as serde::ser::Error>::custom(format_args!(
                    "{} has no JSON representation",
                    description
                )))
            }
        }
    }
}

macro_rules! from_int {
    ($variant:ident, $wide:ty => $($ty:ty),*) => {
        $(
            impl From<$ty> for Number {
                fn from(value: $ty) -> Self {
                    Number::$variant(value as $wide)
                }
            }

            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::from(value))
                }
            }
        )*
    };
}

from_int!(Int, i64 => i8, i16, i32, i64, isize);
from_int!(Uint, u64 => u8, u16, u32, u64, usize);

impl From<f32> for Number {
    fn from(value: f32) -> Self {
        Number::Float32(value)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float64(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(Number::Float32(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Float64(value))
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Value::String(value.to_string())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(value: DateTime<Tz>) -> Self {
        Value::Timestamp(value.with_timezone(&Utc))
    }
}

impl From<SystemTime> for Value {
    fn from(value: SystemTime) -> Self {
        Value::Timestamp(DateTime::<Utc>::from(value))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::Array(value.into_iter().map(Into::into).collect())
    }
}

impl From<FieldMap> for Value {
    fn from(value: FieldMap) -> Self {
        Value::Object(value)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}
