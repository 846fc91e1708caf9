//! Serde-based fallback encoding.
//!
//! This module provides the [`Serializer`] that writes any `Serialize` type
//! as JSON straight into a byte buffer. It is the second tier behind the fast
//! encoder: structs, enums, tuples and anything wrapped in
//! [`Value::Reflect`] end up here.
//!
//! ## Overview
//!
//! - **Structs** become objects keyed by field name. Serde attributes are
//!   honored, so `#[serde(rename = "..")]` changes the key and
//!   `#[serde(skip)]` drops the field.
//! - **Enums** are externally tagged: `"Unit"`, `{"Newtype":..}`,
//!   `{"Tuple":[..]}`, `{"Struct":{..}}`.
//! - **Maps** must have string (or `char`) keys.
//! - **Timestamps** render exactly like the fast encoder when routed through
//!   [`Timestamp`] or the [`timestamp`] helper module.
//!
//! Anything else that cannot be represented fails with the
//! [`Error::UnsupportedType`] sentinel.
//!
//! ## Usage
//!
//! ```rust
//! use json_logger::marshal;
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Charge {
//!     #[serde(rename = "amount_cents")]
//!     amount: u64,
//!     #[serde(skip)]
//!     card_number: String,
//!     currency: &'static str,
//! }
//!
//! let charge = Charge { amount: 4200, card_number: "4242".into(), currency: "USD" };
//!
//! let mut buf = Vec::new();
//! marshal(&mut buf, &charge).unwrap();
//! assert_eq!(buf, br#"{"amount_cents":4200,"currency":"USD"}"#);
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use json_logger::Serializer;
//! use serde::Serialize;
//!
//! let mut serializer = Serializer::new();
//! vec![1, 2, 3].serialize(&mut serializer).unwrap();
//!
//! assert_eq!(serializer.into_inner(), b"[1,2,3]");
//! ```

use crate::scalar::{self, Rfc3339Nano};
use crate::{Error, FieldMap, Number, Result, Value};
use chrono::{DateTime, TimeZone, Utc};
use serde::{ser, Serialize};

/// The JSON serializer.
///
/// Appends compact JSON to an owned byte buffer. Created empty via
/// [`Serializer::new`], or around an existing buffer via
/// [`Serializer::with_buffer`] so pooled capacity is reused.
#[derive(Debug, Default)]
pub struct Serializer {
    output: Vec<u8>,
}

impl Serializer {
    pub fn new() -> Self {
        Serializer {
            output: Vec::with_capacity(128),
        }
    }

    /// Serializer appending to `output`; existing bytes are kept.
    pub fn with_buffer(output: Vec<u8>) -> Self {
        Serializer { output }
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.output
    }

    /// Opens an externally tagged variant: `{"name":`.
    fn begin_variant(&mut self, variant: &str) {
        self.output.push(b'{');
        scalar::quote(&mut self.output, variant);
        self.output.push(b':');
    }
}

impl<'a> ser::Serializer for &'a mut Serializer {
    type Ok = ();
    type Error = Error;

    type SerializeSeq = Compound<'a>;
    type SerializeTuple = Compound<'a>;
    type SerializeTupleStruct = Compound<'a>;
    type SerializeTupleVariant = Compound<'a>;
    type SerializeMap = Compound<'a>;
    type SerializeStruct = Compound<'a>;
    type SerializeStructVariant = Compound<'a>;

    fn serialize_bool(self, v: bool) -> Result<()> {
        let literal: &[u8] = if v { b"true" } else { b"false" };
        self.output.extend_from_slice(literal);
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        scalar::format_int(&mut self.output, v);
        Ok(())
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        scalar::format_uint(&mut self.output, v);
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        scalar::format_f32(&mut self.output, v);
        Ok(())
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        scalar::format_f64(&mut self.output, v);
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<()> {
        let mut tmp = [0u8; 4];
        self.serialize_str(v.encode_utf8(&mut tmp))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        scalar::quote(&mut self.output, v);
        Ok(())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.output.push(b'[');
        for (i, byte) in v.iter().enumerate() {
            if i > 0 {
                self.output.push(b',');
            }
            scalar::format_uint(&mut self.output, u64::from(*byte));
        }
        self.output.push(b']');
        Ok(())
    }

    fn serialize_none(self) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_some<T>(self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.output.extend_from_slice(b"null");
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<()> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.begin_variant(variant);
        value.serialize(&mut *self)?;
        self.output.push(b'}');
        Ok(())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Compound<'a>> {
        Ok(Compound::open(self, b'[', b"]"))
    }

    fn serialize_tuple(self, len: usize) -> Result<Compound<'a>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Compound<'a>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound<'a>> {
        self.begin_variant(variant);
        Ok(Compound::open(self, b'[', b"]}"))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Compound<'a>> {
        Ok(Compound::open(self, b'{', b"}"))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<Compound<'a>> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound<'a>> {
        self.begin_variant(variant);
        Ok(Compound::open(self, b'{', b"}}"))
    }
}

/// State shared by every sequence-like and map-like shape: the separator
/// bookkeeping and the bytes that close the shape.
pub struct Compound<'a> {
    ser: &'a mut Serializer,
    first: bool,
    closing: &'static [u8],
}

impl<'a> Compound<'a> {
    fn open(ser: &'a mut Serializer, open: u8, closing: &'static [u8]) -> Self {
        ser.output.push(open);
        Compound {
            ser,
            first: true,
            closing,
        }
    }

    fn separate(&mut self) {
        if self.first {
            self.first = false;
        } else {
            self.ser.output.push(b',');
        }
    }

    fn element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.separate();
        value.serialize(&mut *self.ser)
    }

    fn field<T: ?Sized + Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.separate();
        scalar::quote(&mut self.ser.output, key);
        self.ser.output.push(b':');
        value.serialize(&mut *self.ser)
    }

    fn close(self) -> Result<()> {
        self.ser.output.extend_from_slice(self.closing);
        Ok(())
    }
}

impl ser::SerializeSeq for Compound<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl ser::SerializeTuple for Compound<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl ser::SerializeTupleStruct for Compound<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl ser::SerializeTupleVariant for Compound<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.element(value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl ser::SerializeMap for Compound<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_value(key)? {
            Value::String(s) => {
                self.separate();
                scalar::quote(&mut self.ser.output, &s);
                self.ser.output.push(b':');
                Ok(())
            }
            _ => Err(Error::UnsupportedType),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl ser::SerializeStruct for Compound<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

impl ser::SerializeStructVariant for Compound<'_> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.field(key, value)
    }

    fn end(self) -> Result<()> {
        self.close()
    }
}

/// Appends the JSON encoding of any `Serialize` value to `buf`.
///
/// On failure `buf` is truncated back to its length on entry.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if the value, or anything nested in it,
/// has no JSON representation.
pub fn marshal<T>(buf: &mut Vec<u8>, value: &T) -> Result<()>
where
    T: ?Sized + Serialize,
{
    let checkpoint = buf.len();
    let mut serializer = Serializer::with_buffer(std::mem::take(buf));
    let result = value.serialize(&mut serializer);
    *buf = serializer.into_inner();
    if result.is_err() {
        buf.truncate(checkpoint);
    }
    result
}

/// Fallback encoding for a [`Value`] the fast encoder rejected.
///
/// A top-level [`Value::Reflect`] is handed to its own
/// [`marshal_json`](crate::Reflect::marshal_json) rather than being
/// converted to a value tree first.
///
/// # Errors
///
/// Same conditions as [`marshal`].
pub fn marshal_value(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Reflect(inner) => {
            let checkpoint = buf.len();
            inner.marshal_json(buf).map_err(|err| {
                buf.truncate(checkpoint);
                err
            })
        }
        Value::Unsupported(_) => Err(Error::UnsupportedType),
        other => marshal(buf, other),
    }
}

/// Serializer producing a [`Value`] tree instead of bytes.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    map: FieldMap,
    current_key: Option<String>,
    variant: Option<&'static str>,
}

/// `{"variant": inner}`, or `inner` itself when there is no tag.
fn tagged(variant: Option<&'static str>, inner: Value) -> Value {
    match variant {
        Some(name) => {
            let mut map = FieldMap::with_capacity(1);
            map.insert(name, inner);
            Value::Object(map)
        }
        None => inner,
    }
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Number(Number::Int(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        Ok(Value::Number(Number::Uint(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Number(Number::Float32(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Number(Number::Float64(v)))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(v.iter().map(|&b| Value::from(b)).collect()))
    }

    fn serialize_none(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        Ok(tagged(Some(variant), to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(Some(len), None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(Some(len), None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(Some(len), Some(variant)))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(len, None))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(len), None))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(len), Some(variant)))
    }
}

impl SerializeVec {
    fn new(len: Option<usize>, variant: Option<&'static str>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(len.unwrap_or(0)),
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Result<Value> {
        Ok(tagged(self.variant, Value::Array(self.vec)))
    }
}

impl SerializeMap {
    fn new(len: Option<usize>, variant: Option<&'static str>) -> Self {
        SerializeMap {
            map: FieldMap::with_capacity(len.unwrap_or(0)),
            current_key: None,
            variant,
        }
    }

    fn finish(self) -> Result<Value> {
        Ok(tagged(self.variant, Value::Object(self.map)))
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_value(key)? {
            Value::String(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            _ => Err(Error::UnsupportedType),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self.current_key.take().ok_or(Error::UnsupportedType)?;
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<Value> {
        self.finish()
    }
}

/// Converts any `Serialize` value into a [`Value`] tree.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] for shapes with no JSON representation,
/// such as maps with non-string keys.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}

/// Serde `with` helper rendering a `DateTime` as a UTC RFC 3339 string with
/// trailing-zero-trimmed nanoseconds.
///
/// ```rust
/// use chrono::{DateTime, TimeZone, Utc};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Event {
///     #[serde(with = "json_logger::timestamp")]
///     at: DateTime<Utc>,
/// }
///
/// let event = Event { at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() };
/// assert_eq!(
///     json_logger::to_string(&event).unwrap(),
///     r#"{"at":"2024-01-01T12:00:00Z"}"#
/// );
/// ```
pub mod timestamp {
    use super::*;

    pub fn serialize<S, Tz>(ts: &DateTime<Tz>, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
        Tz: TimeZone,
    {
        serializer.collect_str(&Rfc3339Nano(&ts.with_timezone(&Utc)))
    }
}

/// A `DateTime<Utc>` that serializes the way the fast encoder writes
/// timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub DateTime<Utc>);

impl<Tz: TimeZone> From<DateTime<Tz>> for Timestamp {
    fn from(ts: DateTime<Tz>) -> Self {
        Timestamp(ts.with_timezone(&Utc))
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        serializer.collect_str(&Rfc3339Nano(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn marshalled<T: Serialize + ?Sized>(value: &T) -> String {
        let mut buf = Vec::new();
        marshal(&mut buf, value).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[derive(Debug, Serialize)]
    struct Inner {
        id: u32,
        tags: Vec<&'static str>,
    }

    #[derive(Serialize)]
    struct Outer {
        name: String,
        #[serde(rename = "innerRecord")]
        inner: Inner,
        #[serde(skip)]
        secret: String,
        maybe: Option<Box<i32>>,
    }

    #[derive(Serialize)]
    enum Shape {
        Empty,
        Circle(f64),
        Pair(i8, i8),
        Rect { w: u8, h: u8 },
    }

    #[test]
    fn test_struct_rename_skip_and_nesting() {
        let value = Outer {
            name: "x".to_string(),
            inner: Inner {
                id: 7,
                tags: vec!["a", "b"],
            },
            secret: "hidden".to_string(),
            maybe: None,
        };
        assert_eq!(
            marshalled(&value),
            r#"{"name":"x","innerRecord":{"id":7,"tags":["a","b"]},"maybe":null}"#
        );
    }

    #[test]
    fn test_nested_pointers_unwrap() {
        let boxed: Option<Box<Option<Box<i32>>>> = Some(Box::new(Some(Box::new(5))));
        assert_eq!(marshalled(&boxed), "5");
        let nil: Option<Box<Option<Box<i32>>>> = Some(Box::new(None));
        assert_eq!(marshalled(&nil), "null");
    }

    #[test]
    fn test_enum_tagging() {
        assert_eq!(marshalled(&Shape::Empty), r#""Empty""#);
        assert_eq!(marshalled(&Shape::Circle(1.5)), r#"{"Circle":1.5}"#);
        assert_eq!(marshalled(&Shape::Pair(1, -1)), r#"{"Pair":[1,-1]}"#);
        assert_eq!(
            marshalled(&Shape::Rect { w: 2, h: 3 }),
            r#"{"Rect":{"w":2,"h":3}}"#
        );
    }

    #[test]
    fn test_maps_and_tuples() {
        let mut map = BTreeMap::new();
        map.insert("b", 2);
        map.insert("a", 1);
        assert_eq!(marshalled(&map), r#"{"a":1,"b":2}"#);
        assert_eq!(marshalled(&(1, "two", 3.5)), r#"[1,"two",3.5]"#);
        assert_eq!(marshalled(&[0u8; 0]), "[]");
        assert_eq!(marshalled(&'c'), r#""c""#);
    }

    #[test]
    fn test_non_string_map_keys_are_unsupported() {
        let mut map = BTreeMap::new();
        map.insert(1, "one");

        let mut buf = b"keep".to_vec();
        assert_eq!(marshal(&mut buf, &map), Err(Error::UnsupportedType));
        assert_eq!(buf, b"keep");
    }

    #[test]
    fn test_unsupported_value_inside_struct() {
        #[derive(Serialize)]
        struct Holder {
            ok: i32,
            bad: Value,
        }

        let holder = Holder {
            ok: 1,
            bad: Value::Unsupported("chan int".to_string()),
        };
        let mut buf = Vec::new();
        assert!(marshal(&mut buf, &holder).unwrap_err().is_unsupported());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_marshal_value_dispatch() {
        let mut buf = Vec::new();
        marshal_value(&mut buf, &Value::reflect(Inner { id: 1, tags: vec![] })).unwrap();
        assert_eq!(buf, br#"{"id":1,"tags":[]}"#);

        buf.clear();
        assert_eq!(
            marshal_value(&mut buf, &Value::unsupported("func()")),
            Err(Error::UnsupportedType)
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_timestamp_helpers() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
            + chrono::Duration::microseconds(250);
        assert_eq!(marshalled(&Timestamp(ts)), r#""2024-05-06T07:08:09.00025Z""#);

        #[derive(Serialize)]
        struct Event {
            #[serde(with = "super::timestamp")]
            at: DateTime<Utc>,
        }
        assert_eq!(
            marshalled(&Event { at: ts }),
            r#"{"at":"2024-05-06T07:08:09.00025Z"}"#
        );
    }

    #[test]
    fn test_to_value_tree() {
        let value = to_value(&Shape::Rect { w: 1, h: 2 }).unwrap();
        let rect = value.as_object().and_then(|m| m.get("Rect")).unwrap();
        assert_eq!(rect.as_object().and_then(|m| m.get("h")), Some(&Value::from(2u8)));

        assert_eq!(to_value(&u64::MAX).unwrap(), Value::from(u64::MAX));
        assert_eq!(to_value(&()).unwrap(), Value::Null);
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(marshalled(&vec![f64::NAN, 1.0]), "[null,1]");
    }
}
