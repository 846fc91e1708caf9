//! Fast-path JSON encoding of [`Value`]s.
//!
//! [`encode`] handles the closed set of shapes that need no serde machinery:
//! null, booleans, numbers, strings, timestamps, and arrays/objects built from
//! them. It reports `false` rather than an error when it meets anything else,
//! because that only means "use the fallback encoder", not "bad data".
//!
//! ## Examples
//!
//! ```rust
//! use json_logger::{encode, value, Value};
//!
//! let mut buf = Vec::new();
//! assert!(encode(&mut buf, &value!({"ids": [1, 2], "ok": true})));
//! assert_eq!(buf, br#"{"ids":[1,2],"ok":true}"#);
//!
//! let mut buf = b"prefix".to_vec();
//! assert!(!encode(&mut buf, &value!([1, (Value::unsupported("chan int"))])));
//! assert_eq!(buf, b"prefix");
//! ```

use crate::scalar::{quote, write_timestamp};
use crate::{FieldMap, Value};

/// Appends the JSON encoding of `value` to `buf`.
///
/// Returns `false` if `value` is, or contains, a [`Value::Reflect`] or
/// [`Value::Unsupported`]. In that case `buf` is truncated back to its
/// length on entry, so no partial fragment is ever left behind.
pub fn encode(buf: &mut Vec<u8>, value: &Value) -> bool {
    let checkpoint = buf.len();
    if encode_value(buf, value) {
        true
    } else {
        buf.truncate(checkpoint);
        false
    }
}

/// May leave a partial fragment in `buf` on failure.
fn encode_value(buf: &mut Vec<u8>, value: &Value) -> bool {
    match value {
        Value::Null => buf.extend_from_slice(b"null"),
        Value::Bool(true) => buf.extend_from_slice(b"true"),
        Value::Bool(false) => buf.extend_from_slice(b"false"),
        Value::Number(n) => n.write(buf),
        Value::String(s) => quote(buf, s),
        Value::Timestamp(ts) => write_timestamp(buf, ts),
        Value::Array(items) => return encode_array(buf, items),
        Value::Object(fields) => return encode_object(buf, fields),
        Value::Reflect(_) | Value::Unsupported(_) => return false,
    }
    true
}

fn encode_array(buf: &mut Vec<u8>, items: &[Value]) -> bool {
    buf.push(b'[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        if !encode_value(buf, item) {
            return false;
        }
    }
    buf.push(b']');
    true
}

fn encode_object(buf: &mut Vec<u8>, fields: &FieldMap) -> bool {
    buf.push(b'{');
    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        quote(buf, key);
        buf.push(b':');
        if !encode_value(buf, value) {
            return false;
        }
    }
    buf.push(b'}');
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Number;
    use chrono::{FixedOffset, TimeZone};

    fn encoded(value: &Value) -> Option<String> {
        let mut buf = Vec::new();
        encode(&mut buf, value).then(|| String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_scalars() {
        assert_eq!(encoded(&Value::Null).as_deref(), Some("null"));
        assert_eq!(encoded(&Value::from(true)).as_deref(), Some("true"));
        assert_eq!(encoded(&Value::from(false)).as_deref(), Some("false"));
        assert_eq!(encoded(&Value::from(-17i8)).as_deref(), Some("-17"));
        assert_eq!(
            encoded(&Value::from(u64::MAX)).as_deref(),
            Some("18446744073709551615")
        );
        assert_eq!(encoded(&Value::from(2.5f32)).as_deref(), Some("2.5"));
        assert_eq!(encoded(&Value::from("a\"b")).as_deref(), Some(r#""a\"b""#));
    }

    #[test]
    fn test_timestamp_in_utc() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let ts = offset.with_ymd_and_hms(2024, 1, 1, 14, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(1_500);
        assert_eq!(
            encoded(&Value::from(ts)).as_deref(),
            Some(r#""2024-01-01T12:00:00.0000015Z""#)
        );
    }

    #[test]
    fn test_containers() {
        let mut inner = FieldMap::new();
        inner.insert("k", Value::Null);
        let value = Value::Array(vec![
            Value::from(1),
            Value::Object(inner),
            Value::Array(vec![]),
        ]);
        assert_eq!(encoded(&value).as_deref(), Some(r#"[1,{"k":null},[]]"#));
        assert_eq!(
            encoded(&Value::Object(FieldMap::new())).as_deref(),
            Some("{}")
        );
    }

    #[test]
    fn test_rejected_shapes_leave_buffer_untouched() {
        let mut buf = b"{\"a\":".to_vec();
        assert!(!encode(&mut buf, &Value::unsupported("func()")));
        assert!(!encode(&mut buf, &Value::reflect(vec![1, 2])));

        let mut nested = FieldMap::new();
        nested.insert("ok", 1);
        nested.insert("bad", Value::Unsupported("chan".into()));
        assert!(!encode(&mut buf, &Value::Array(vec![Value::Object(nested)])));

        assert_eq!(buf, b"{\"a\":");
    }

    #[test]
    fn test_number_variants() {
        assert_eq!(
            encoded(&Value::Number(Number::Float64(f64::NAN))).as_deref(),
            Some("null")
        );
        assert_eq!(
            encoded(&Value::Number(Number::Int(0))).as_deref(),
            Some("0")
        );
    }
}
