//! # json_logger
//!
//! A structured logger that writes one JSON object per line, built around a
//! low-allocation value encoder.
//!
//! ## How an entry is written
//!
//! Every logging call runs through the same pipeline:
//!
//! - **Level filter**: calls below the configured minimum return before any
//!   work is done
//! - **Merge**: overrides between the logger's base fields and the call's
//!   field maps are resolved into a borrowed view; keys are normalized,
//!   later maps win and nothing is copied
//! - **Render**: a [`LogWriter`] writes `timestamp`, `level`, `message` and
//!   the fields into a pooled buffer
//! - **Emit**: the buffer is written to the sink under a lock, so concurrent
//!   entries never interleave
//!
//! Field values go through a two-tier encoder. [`encode()`] handles the common
//! shapes directly. Everything else (structs, enums, any `Serialize` type)
//! goes through the serde-based [`marshal`]. A value neither can represent is
//! written as its display text and the entry gains an `error` field; a log
//! call never fails.
//!
//! ## Quick Start
//!
//! ```rust
//! use json_logger::{fields, JsonLogger, Level, Logger, LoggerOptions};
//!
//! let logger = JsonLogger::with_options(
//!     LoggerOptions::new()
//!         .with_level(Level::Info)
//!         .with_output(std::io::stdout())
//!         .with_base_field("service", "payments"),
//! );
//!
//! logger.info("charge succeeded", &[&fields!("amount": 42, "currency": "USD")]);
//! // {"timestamp":"2024-01-01T12:00:00.123456789Z","level":"info","message":"charge succeeded","service":"payments","amount":42,"currency":"USD"}
//! ```
//!
//! ### Logging your own types
//!
//! ```rust
//! use json_logger::{FieldMap, JsonLogger, Logger, LoggerOptions, Value};
//! use serde::Serialize;
//!
//! #[derive(Debug, Serialize)]
//! struct Card {
//!     brand: &'static str,
//!     #[serde(rename = "last_four")]
//!     last4: &'static str,
//! }
//!
//! let logger = JsonLogger::with_options(LoggerOptions::new().with_output(std::io::sink()));
//! let mut fields = FieldMap::new();
//! fields.insert("card", Value::reflect(Card { brand: "visa", last4: "4242" }));
//! logger.info("card on file", &[&fields]);
//! ```
//!
//! ### Package-level helpers
//!
//! ```rust
//! use json_logger::{fields, global};
//!
//! global::warn("disk almost full", &[&fields!("free_mb": 120)]);
//! ```
//!
//! ## Encoding without logging
//!
//! ```rust
//! use json_logger::{to_string, value};
//!
//! assert_eq!(to_string(&value!({"ok": true})).unwrap(), r#"{"ok":true}"#);
//! ```

pub mod encode;
pub mod error;
pub mod global;
pub mod logger;
pub mod macros;
pub mod map;
pub mod merge;
pub mod options;
pub mod pool;
pub mod scalar;
pub mod ser;
pub mod value;
pub mod writer;

pub use encode::encode;
pub use error::{Error, Result};
pub use global::{clear_logger, set_logger};
pub use logger::{JsonLogger, Logger};
pub use map::FieldMap;
pub use merge::{is_canonical_key, merge, normalize_key};
pub use options::{Format, Level, LoggerOptions, TimeFormat};
pub use ser::{marshal, marshal_value, timestamp, Serializer, Timestamp, ValueSerializer};
pub use value::{Number, Reflect, Value};
pub use writer::{CompactJsonLogWriter, JsonLogWriter, LogWriter, PrettyJsonLogWriter};

use serde::Serialize;
use std::io;

/// Serialize any `T: Serialize` to JSON bytes.
///
/// # Examples
///
/// ```rust
/// use json_logger::to_vec;
///
/// assert_eq!(to_vec(&(1, "a")).unwrap(), br#"[1,"a"]"#);
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if the value has no JSON representation.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<u8>>
where
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::new();
    value.serialize(&mut serializer)?;
    Ok(serializer.into_inner())
}

/// Serialize any `T: Serialize` to a JSON string.
///
/// # Examples
///
/// ```rust
/// use json_logger::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// assert_eq!(to_string(&Point { x: 1, y: 2 }).unwrap(), r#"{"x":1,"y":2}"#);
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if the value has no JSON representation.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    String::from_utf8(to_vec(value)?).map_err(Error::io)
}

/// Convert any `T: Serialize` to a [`Value`].
///
/// # Examples
///
/// ```rust
/// use json_logger::{to_value, Value};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value: Value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert!(value.is_object());
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if the value has no JSON representation.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    ser::to_value(value)
}

/// Serialize any `T: Serialize` as JSON into a writer.
///
/// The value is fully encoded before anything is written, so the writer
/// never sees a partial document.
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if the value has no JSON
/// representation, or [`Error::Io`] if writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(mut writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let bytes = to_vec(value)?;
    writer.write_all(&bytes).map_err(Error::io)
}
