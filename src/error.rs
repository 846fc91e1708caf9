//! Error types for encoding and logging.
//!
//! The logging façade itself never returns errors: a value that cannot be
//! represented degrades to a string and the entry carries an `error` field.
//! The types here surface through the lower-level encoding API
//! ([`marshal`](crate::marshal), [`to_writer`](crate::to_writer)) and through
//! [`LogWriter::write_entry`](crate::LogWriter::write_entry), whose `Err`
//! means "the entry was written, but some field needed a fallback".
//!
//! ## Examples
//!
//! ```rust
//! use json_logger::{marshal, Error, Value};
//!
//! let mut buf = Vec::new();
//! let result = marshal(&mut buf, &Value::unsupported("chan int"));
//!
//! assert!(matches!(result, Err(Error::UnsupportedType)));
//! assert!(buf.is_empty());
//! ```

use std::fmt;
use thiserror::Error;

/// Represents all possible errors produced by the encoder and the logger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A value has a shape that neither encoder can represent as JSON.
    ///
    /// This is a sentinel: it is the same value whatever the offending shape
    /// was, so callers can branch on "was this supported" without caring
    /// which type failed.
    #[error("unsupported type for marshal")]
    UnsupportedType,

    /// IO error while writing encoded bytes to a writer.
    #[error("IO error: {0}")]
    Io(String),

    /// A level name that is not one of `debug`, `info`, `warn` or `error`.
    #[error("invalid log level: {0:?}")]
    InvalidLevel(String),
}

impl Error {
    /// Creates an I/O error from any displayable cause.
    pub fn io<T: fmt::Display>(msg: T) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns `true` if this is the unsupported-type sentinel.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use json_logger::Error;
    ///
    /// assert!(Error::UnsupportedType.is_unsupported());
    /// assert!(!Error::io("broken pipe").is_unsupported());
    /// ```
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Error::UnsupportedType)
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        tracing::debug!(reason = %msg, "value rejected by serializer");
        Error::UnsupportedType
    }
}

pub type Result<T> = std::result::Result<T, Error>;
