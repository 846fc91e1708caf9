//! Entry rendering strategies.
//!
//! A [`LogWriter`] turns one log call into one complete JSON object in a
//! byte buffer. All strategies write the same fields in the same order:
//! `timestamp`, `level`, `message`, then every field of every map as it is
//! encountered, then an `error` field if any value needed a fallback. They
//! differ only in whitespace.
//!
//! ## Examples
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use json_logger::{FieldMap, JsonLogWriter, LogWriter, TimeFormat};
//!
//! let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
//! let base = FieldMap::from([("service", "payments")]);
//!
//! let mut buf = Vec::new();
//! JsonLogWriter::new()
//!     .write_entry(&mut buf, ts, &TimeFormat::Rfc3339Nano, "info", "ok", &base, &[])
//!     .unwrap();
//!
//! assert_eq!(
//!     buf,
//!     b"{\"timestamp\":\"2024-01-01T12:00:00Z\",\"level\":\"info\",\"message\":\"ok\",\"service\":\"payments\"}\n"
//! );
//! ```

use crate::encode::encode;
use crate::merge::MergedFields;
use crate::scalar::quote;
use crate::ser::marshal_value;
use crate::{Error, FieldMap, Result, TimeFormat, Value};
use chrono::{DateTime, Utc};
use std::fmt;

/// A rendering strategy for complete log entries.
///
/// Implementations must always emit a complete, newline-terminated entry.
/// An `Err` return means the entry *was* written but at least one field
/// value had to be replaced by its string form.
pub trait LogWriter: fmt::Debug + Send + Sync {
    /// Appends one entry holding the fields of `fields`, in view order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] if any value could not be encoded.
    fn write_fields(
        &self,
        buf: &mut Vec<u8>,
        timestamp: DateTime<Utc>,
        time_format: &TimeFormat,
        level: &str,
        message: &str,
        fields: &MergedFields<'_>,
    ) -> Result<()>;

    /// Appends one entry to `buf`.
    ///
    /// Fields of `base_fields` are written first, then each map of
    /// `additional` in order. Keys are normalized but not deduplicated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] if any value could not be encoded.
    #[allow(clippy::too_many_arguments)]
    fn write_entry(
        &self,
        buf: &mut Vec<u8>,
        timestamp: DateTime<Utc>,
        time_format: &TimeFormat,
        level: &str,
        message: &str,
        base_fields: &FieldMap,
        additional: &[&FieldMap],
    ) -> Result<()> {
        self.write_fields(
            buf,
            timestamp,
            time_format,
            level,
            message,
            &MergedFields::chained(base_fields, additional),
        )
    }
}

/// Writes `value`, trying the fast encoder, then the serde fallback, then
/// its display text. Returns `false` only when the display text was used.
fn write_value(buf: &mut Vec<u8>, value: &Value) -> bool {
    if encode(buf, value) || marshal_value(buf, value).is_ok() {
        return true;
    }
    quote(buf, &value.to_string());
    false
}

/// Field separators and entry framing for one layout.
struct Layout<'a> {
    indent: &'a str,
    open: &'a str,
    field_sep: &'a str,
    key_sep: &'a str,
    close: &'a str,
}

const STANDARD: Layout<'static> = Layout {
    indent: "",
    open: "{",
    field_sep: ",",
    key_sep: ":",
    close: "}\n",
};

impl Layout<'_> {
    fn key(&self, buf: &mut Vec<u8>, key: &str) {
        buf.extend_from_slice(self.indent.as_bytes());
        quote(buf, key);
        buf.extend_from_slice(self.key_sep.as_bytes());
    }

    fn entry(
        &self,
        buf: &mut Vec<u8>,
        timestamp: DateTime<Utc>,
        time_format: &TimeFormat,
        level: &str,
        message: &str,
        fields: &MergedFields<'_>,
    ) -> Result<()> {
        buf.extend_from_slice(self.open.as_bytes());

        self.key(buf, "timestamp");
        time_format.write_quoted(buf, &timestamp);
        buf.extend_from_slice(self.field_sep.as_bytes());

        self.key(buf, "level");
        quote(buf, level);
        buf.extend_from_slice(self.field_sep.as_bytes());

        self.key(buf, "message");
        quote(buf, message);

        let mut ok = true;
        for (key, value) in fields {
            buf.extend_from_slice(self.field_sep.as_bytes());
            self.key(buf, key);
            ok &= write_value(buf, value);
        }

        if !ok {
            buf.extend_from_slice(self.field_sep.as_bytes());
            self.key(buf, "error");
            quote(buf, &Error::UnsupportedType.to_string());
        }

        buf.extend_from_slice(self.close.as_bytes());

        if ok {
            Ok(())
        } else {
            Err(Error::UnsupportedType)
        }
    }
}

/// One JSON object per line with no insignificant whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLogWriter;

impl JsonLogWriter {
    #[must_use]
    pub fn new() -> Self {
        JsonLogWriter
    }
}

impl LogWriter for JsonLogWriter {
    fn write_fields(
        &self,
        buf: &mut Vec<u8>,
        timestamp: DateTime<Utc>,
        time_format: &TimeFormat,
        level: &str,
        message: &str,
        fields: &MergedFields<'_>,
    ) -> Result<()> {
        STANDARD.entry(buf, timestamp, time_format, level, message, fields)
    }
}

/// Compact entries. Currently byte-identical to [`JsonLogWriter`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CompactJsonLogWriter {
    inner: JsonLogWriter,
}

impl CompactJsonLogWriter {
    #[must_use]
    pub fn new() -> Self {
        CompactJsonLogWriter {
            inner: JsonLogWriter::new(),
        }
    }
}

impl LogWriter for CompactJsonLogWriter {
    fn write_fields(
        &self,
        buf: &mut Vec<u8>,
        timestamp: DateTime<Utc>,
        time_format: &TimeFormat,
        level: &str,
        message: &str,
        fields: &MergedFields<'_>,
    ) -> Result<()> {
        self.inner.write_fields(buf, timestamp, time_format, level, message, fields)
    }
}

/// One field per line, each prefixed by an indent string.
///
/// ```text
/// {
///   "timestamp": "2024-01-01T12:00:00Z",
///   "level": "info",
///   "message": "ok"
/// }
/// ```
///
/// Nested values stay on the field's line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrettyJsonLogWriter {
    indent: String,
}

impl PrettyJsonLogWriter {
    /// Creates a pretty writer; an empty `indent` means two spaces.
    #[must_use]
    pub fn new(indent: &str) -> Self {
        let indent = if indent.is_empty() { "  " } else { indent };
        PrettyJsonLogWriter {
            indent: indent.to_string(),
        }
    }

    #[must_use]
    pub fn indent(&self) -> &str {
        &self.indent
    }

    fn layout(&self) -> Layout<'_> {
        Layout {
            indent: &self.indent,
            open: "{\n",
            field_sep: ",\n",
            key_sep: ": ",
            close: "\n}\n",
        }
    }
}

impl Default for PrettyJsonLogWriter {
    fn default() -> Self {
        PrettyJsonLogWriter::new("")
    }
}

impl LogWriter for PrettyJsonLogWriter {
    fn write_fields(
        &self,
        buf: &mut Vec<u8>,
        timestamp: DateTime<Utc>,
        time_format: &TimeFormat,
        level: &str,
        message: &str,
        fields: &MergedFields<'_>,
    ) -> Result<()> {
        self.layout().entry(buf, timestamp, time_format, level, message, fields)
    }
}
