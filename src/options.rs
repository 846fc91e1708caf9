//! Configuration options for [`JsonLogger`](crate::JsonLogger).
//!
//! This module provides the types that describe how a logger behaves:
//!
//! - [`Level`]: minimum severity that gets written
//! - [`TimeFormat`]: how the `timestamp` field is rendered
//! - [`Format`]: which built-in rendering strategy to use
//! - [`LoggerOptions`]: the builder that ties them together
//!
//! ## Examples
//!
//! ```rust
//! use json_logger::{FieldMap, Format, JsonLogger, Level, LoggerOptions};
//!
//! let options = LoggerOptions::new()
//!     .with_level(Level::Warn)
//!     .with_output(std::io::sink())
//!     .with_base_field("service", "payments")
//!     .with_custom_time_format("%Y-%m-%d %H:%M:%S")
//!     .with_format(Format::pretty());
//!
//! let logger = JsonLogger::with_options(options);
//! assert_eq!(logger.level(), Level::Warn);
//! ```

use crate::merge::{merge, normalize_key};
use crate::scalar::{quote, write_timestamp};
use crate::writer::{CompactJsonLogWriter, JsonLogWriter, LogWriter, PrettyJsonLogWriter};
use crate::{Error, FieldMap, Value};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};
use std::fmt::{self, Write as _};
use std::io;
use std::str::FromStr;

/// Severity of a log entry, ordered from least to most severe.
///
/// # Examples
///
/// ```rust
/// use json_logger::Level;
///
/// assert!(Level::Debug < Level::Error);
/// assert_eq!(Level::Warn.as_str(), "warn");
/// assert_eq!("WARNING".parse::<Level>().unwrap(), Level::Warn);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl Level {
    /// Returns the token written in the `level` field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(Error::InvalidLevel(s.to_string())),
        }
    }
}

/// How the `timestamp` field of an entry is rendered.
///
/// Timestamps are always converted to UTC first.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum TimeFormat {
    /// RFC 3339 with nanoseconds, trailing zeros trimmed.
    #[default]
    Rfc3339Nano,
    /// A `strftime`-style pattern, see [`chrono::format::strftime`].
    Custom(String),
}

impl TimeFormat {
    /// Builds a custom format, or `None` if the pattern is empty or invalid.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use json_logger::TimeFormat;
    ///
    /// assert!(TimeFormat::custom("%H:%M:%S").is_some());
    /// assert!(TimeFormat::custom("").is_none());
    /// assert!(TimeFormat::custom("%Q").is_none());
    /// ```
    #[must_use]
    pub fn custom(pattern: &str) -> Option<Self> {
        if pattern.is_empty() {
            return None;
        }
        let invalid = StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error));
        (!invalid).then(|| TimeFormat::Custom(pattern.to_string()))
    }

    /// Appends `ts` rendered in this format as a quoted JSON string.
    ///
    /// A custom pattern that fails to render falls back to RFC 3339.
    pub fn write_quoted(&self, buf: &mut Vec<u8>, ts: &DateTime<Utc>) {
        match self {
            TimeFormat::Rfc3339Nano => write_timestamp(buf, ts),
            TimeFormat::Custom(pattern) => {
                let mut text = String::with_capacity(pattern.len() + 16);
                if write!(text, "{}", ts.format(pattern)).is_ok() {
                    quote(buf, &text);
                } else {
                    write_timestamp(buf, ts);
                }
            }
        }
    }
}

/// Built-in rendering strategies.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Format {
    /// One object per line, no insignificant whitespace.
    #[default]
    Standard,
    /// Same bytes as [`Format::Standard`].
    Compact,
    /// One field per line, each prefixed by `indent`.
    Pretty { indent: String },
}

impl Format {
    /// Pretty format with the default two-space indent.
    #[must_use]
    pub fn pretty() -> Self {
        Format::Pretty {
            indent: String::new(),
        }
    }

    pub(crate) fn into_writer(self) -> Box<dyn LogWriter> {
        match self {
            Format::Standard => Box::new(JsonLogWriter::new()),
            Format::Compact => Box::new(CompactJsonLogWriter::new()),
            Format::Pretty { indent } => Box::new(PrettyJsonLogWriter::new(&indent)),
        }
    }
}

/// Configuration for a [`JsonLogger`](crate::JsonLogger).
///
/// Defaults: [`Level::Info`], stdout, no base fields,
/// [`TimeFormat::Rfc3339Nano`], [`Format::Standard`].
pub struct LoggerOptions {
    pub(crate) level: Level,
    pub(crate) output: Box<dyn io::Write + Send>,
    pub(crate) base_fields: FieldMap,
    pub(crate) time_format: TimeFormat,
    pub(crate) writer: Box<dyn LogWriter>,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        LoggerOptions {
            level: Level::default(),
            output: Box::new(io::stdout()),
            base_fields: FieldMap::new(),
            time_format: TimeFormat::default(),
            writer: Format::default().into_writer(),
        }
    }
}

impl fmt::Debug for LoggerOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerOptions")
            .field("level", &self.level)
            .field("base_fields", &self.base_fields)
            .field("time_format", &self.time_format)
            .field("writer", &self.writer)
            .finish_non_exhaustive()
    }
}

impl LoggerOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum level; entries below it are dropped before any
    /// formatting work.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the sink entries are written to.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use json_logger::LoggerOptions;
    ///
    /// let options = LoggerOptions::new().with_output(std::io::stderr());
    /// ```
    #[must_use]
    pub fn with_output<W>(mut self, output: W) -> Self
    where
        W: io::Write + Send + 'static,
    {
        self.output = Box::new(output);
        self
    }

    /// Merges `fields` into the base fields, normalizing keys. Later calls
    /// win on collisions.
    #[must_use]
    pub fn with_base_fields(mut self, fields: &FieldMap) -> Self {
        merge(&mut self.base_fields, [fields]);
        self
    }

    /// Adds a single base field.
    #[must_use]
    pub fn with_base_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.base_fields.insert(normalize_key(key), value);
        self
    }

    #[must_use]
    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    /// Uses a `strftime`-style pattern for the `timestamp` field.
    ///
    /// An empty or invalid pattern is ignored and the current format kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use json_logger::{LoggerOptions, TimeFormat};
    ///
    /// let options = LoggerOptions::new().with_custom_time_format("");
    /// assert_eq!(options.time_format(), &TimeFormat::Rfc3339Nano);
    /// ```
    #[must_use]
    pub fn with_custom_time_format(mut self, pattern: &str) -> Self {
        match TimeFormat::custom(pattern) {
            Some(format) => self.time_format = format,
            None => tracing::debug!(pattern, "ignoring unusable time format"),
        }
        self
    }

    /// Selects one of the built-in rendering strategies.
    #[must_use]
    pub fn with_format(mut self, format: Format) -> Self {
        self.writer = format.into_writer();
        self
    }

    /// Installs a custom rendering strategy.
    #[must_use]
    pub fn with_writer<L>(mut self, writer: L) -> Self
    where
        L: LogWriter + 'static,
    {
        self.writer = Box::new(writer);
        self
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn base_fields(&self) -> &FieldMap {
        &self.base_fields
    }

    #[must_use]
    pub fn time_format(&self) -> &TimeFormat {
        &self.time_format
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_level_ordering_and_tokens() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
        assert_eq!(Level::default(), Level::Info);
        assert_eq!(Level::Error.to_string(), "error");
    }

    #[test]
    fn test_level_from_str() {
        assert_eq!(" Debug ".parse::<Level>(), Ok(Level::Debug));
        assert_eq!("warning".parse::<Level>(), Ok(Level::Warn));
        assert_eq!(
            "loud".parse::<Level>(),
            Err(Error::InvalidLevel("loud".to_string()))
        );
    }

    #[test]
    fn test_custom_time_format_is_quoted() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let format = TimeFormat::custom("%d/%m/%Y \"%H\"").unwrap();

        let mut buf = Vec::new();
        format.write_quoted(&mut buf, &ts);
        assert_eq!(buf, br#""01/01/2024 \"12\"""#);
    }

    #[test]
    fn test_invalid_time_format_is_ignored() {
        let options = LoggerOptions::new()
            .with_custom_time_format("%Y")
            .with_custom_time_format("%Q");
        assert_eq!(
            options.time_format(),
            &TimeFormat::Custom("%Y".to_string())
        );
    }

    #[test]
    fn test_base_fields_merge_and_normalize() {
        let first = FieldMap::from([("service", "a"), ("region:", "eu")]);
        let second = FieldMap::from([("'service'", "b")]);

        let options = LoggerOptions::new()
            .with_base_fields(&first)
            .with_base_fields(&second)
            .with_base_field(" version ", 3);

        let fields = options.base_fields();
        assert_eq!(fields.get("service").and_then(Value::as_str), Some("b"));
        assert_eq!(fields.get("region").and_then(Value::as_str), Some("eu"));
        assert_eq!(fields.get("version"), Some(&Value::from(3)));
    }

    #[test]
    fn test_debug_omits_output() {
        let rendered = format!("{:?}", LoggerOptions::new().with_level(Level::Error));
        assert!(rendered.contains("Error"));
        assert!(rendered.contains(".."));
    }
}
