//! The severity façade and the JSON logger behind it.
//!
//! [`Logger`] is the four-method interface applications log through.
//! [`JsonLogger`] implements it by running every call through the same
//! pipeline:
//!
//! 1. drop the call if its level is below the configured minimum
//! 2. resolve overrides between base fields and call fields into a borrowed
//!    [`MergedFields`] view, using pooled scratch space
//! 3. render the entry into a pooled buffer with the configured [`LogWriter`]
//! 4. write the buffer to the sink while holding the sink lock
//!
//! Keys and values are borrowed from the caller's maps throughout, so once
//! the pools are warm a call with the default time format does not allocate.
//!
//! Logging never fails from the caller's point of view. Values that cannot be
//! encoded degrade inside the entry, and sink errors are reported through
//! `tracing` and otherwise dropped.
//!
//! ## Examples
//!
//! ```rust
//! use json_logger::{fields, JsonLogger, Level, Logger, LoggerOptions};
//!
//! let logger = JsonLogger::with_options(
//!     LoggerOptions::new()
//!         .with_level(Level::Debug)
//!         .with_output(std::io::sink())
//!         .with_base_field("service", "payments"),
//! );
//!
//! logger.info("charge succeeded", &[&fields!("amount": 42, "currency": "USD")]);
//! logger.debug("no fields", &[]);
//! ```

use crate::merge::{MergedFields, Slot};
use crate::options::{Level, LoggerOptions, TimeFormat};
use crate::pool::Pool;
use crate::writer::LogWriter;
use crate::{Error, FieldMap, Result};
use chrono::Utc;
use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

/// Leveled logging interface.
///
/// Each method takes a message and any number of field maps; later maps
/// override earlier ones on key collisions.
pub trait Logger: Send + Sync {
    fn debug(&self, message: &str, fields: &[&FieldMap]);
    fn info(&self, message: &str, fields: &[&FieldMap]);
    fn warn(&self, message: &str, fields: &[&FieldMap]);
    fn error(&self, message: &str, fields: &[&FieldMap]);
}

impl<L: Logger + ?Sized> Logger for Arc<L> {
    fn debug(&self, message: &str, fields: &[&FieldMap]) {
        (**self).debug(message, fields);
    }

    fn info(&self, message: &str, fields: &[&FieldMap]) {
        (**self).info(message, fields);
    }

    fn warn(&self, message: &str, fields: &[&FieldMap]) {
        (**self).warn(message, fields);
    }

    fn error(&self, message: &str, fields: &[&FieldMap]) {
        (**self).error(message, fields);
    }
}

/// A [`Logger`] writing one JSON object per entry.
///
/// Configuration is fixed at construction. The logger can be shared across
/// threads (`Arc<JsonLogger>`); concurrent entries never interleave in the
/// sink, but their relative order is unspecified.
pub struct JsonLogger {
    level: Level,
    sink: Mutex<Box<dyn Write + Send>>,
    base_fields: FieldMap,
    time_format: TimeFormat,
    writer: Box<dyn LogWriter>,
    buffers: Pool<Vec<u8>>,
    slots: Pool<Vec<Slot>>,
}

impl JsonLogger {
    /// Logger at [`Level::Info`] writing standard entries to stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(LoggerOptions::default())
    }

    #[must_use]
    pub fn with_options(options: LoggerOptions) -> Self {
        JsonLogger {
            level: options.level,
            sink: Mutex::new(options.output),
            base_fields: options.base_fields,
            time_format: options.time_format,
            writer: options.writer,
            buffers: Pool::new(),
            slots: Pool::new(),
        }
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns `true` if entries at `level` would be written.
    #[inline]
    #[must_use]
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level
    }

    #[must_use]
    pub fn base_fields(&self) -> &FieldMap {
        &self.base_fields
    }

    #[must_use]
    pub fn time_format(&self) -> &TimeFormat {
        &self.time_format
    }

    /// Writes one entry at `level`.
    pub fn log(&self, level: Level, message: &str, fields: &[&FieldMap]) {
        if !self.enabled(level) {
            return;
        }

        let mut slots = self.slots.acquire();
        let merged = MergedFields::merged(&self.base_fields, fields, &mut slots);

        let mut buf = self.buffers.acquire();
        if let Err(err) = self.writer.write_fields(
            &mut buf,
            Utc::now(),
            &self.time_format,
            level.as_str(),
            message,
            &merged,
        ) {
            tracing::debug!(error = %err, level = level.as_str(), "log entry written with degraded fields");
        }

        let mut sink = self.sink.lock();
        if let Err(err) = sink.write_all(&buf) {
            tracing::warn!(error = %err, "failed to write log entry");
        }
    }

    /// Flushes the sink.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the sink fails to flush.
    pub fn flush(&self) -> Result<()> {
        self.sink.lock().flush().map_err(|err| {
            tracing::warn!(error = %err, "failed to flush log sink");
            Error::io(err)
        })
    }
}

impl Default for JsonLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for JsonLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLogger")
            .field("level", &self.level)
            .field("base_fields", &self.base_fields)
            .field("time_format", &self.time_format)
            .field("writer", &self.writer)
            .finish_non_exhaustive()
    }
}

impl Logger for JsonLogger {
    fn debug(&self, message: &str, fields: &[&FieldMap]) {
        self.log(Level::Debug, message, fields);
    }

    fn info(&self, message: &str, fields: &[&FieldMap]) {
        self.log(Level::Info, message, fields);
    }

    fn warn(&self, message: &str, fields: &[&FieldMap]) {
        self.log(Level::Warn, message, fields);
    }

    fn error(&self, message: &str, fields: &[&FieldMap]) {
        self.log(Level::Error, message, fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use std::io;

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<Vec<u8>>>);

    impl Write for Shared {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Shared {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().clone()).unwrap()
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    fn logger(level: Level, sink: &Shared) -> JsonLogger {
        JsonLogger::with_options(
            LoggerOptions::new()
                .with_level(level)
                .with_output(sink.clone()),
        )
    }

    #[test]
    fn test_level_filter() {
        let sink = Shared::default();
        let logger = logger(Level::Warn, &sink);
        logger.debug("d", &[]);
        logger.info("i", &[]);
        assert!(sink.text().is_empty());

        logger.warn("w", &[]);
        logger.error("e", &[]);
        let text = sink.text();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains(r#""level":"warn""#));
        assert!(text.contains(r#""level":"error""#));
    }

    #[test]
    fn test_call_fields_override_base_fields() {
        let sink = Shared::default();
        let logger = JsonLogger::with_options(
            LoggerOptions::new()
                .with_output(sink.clone())
                .with_base_field("service", "base")
                .with_base_field("region", "eu"),
        );

        let first = FieldMap::from([("service", "call")]);
        let second = FieldMap::from([("'region':", Value::from("us"))]);
        logger.info("m", &[&first, &second]);

        let text = sink.text();
        assert!(text.contains(r#""service":"call""#));
        assert!(text.contains(r#""region":"us""#));
        assert!(!text.contains("base"));
        assert_eq!(text.matches("\"service\"").count(), 1);
    }

    #[test]
    fn test_buffers_return_to_pool() {
        let sink = Shared::default();
        let logger = logger(Level::Info, &sink);
        logger.info("a", &[]);
        logger.info("b", &[]);
        assert_eq!(logger.buffers.idle(), 1);
        assert_eq!(logger.slots.idle(), 1);
    }

    #[test]
    fn test_sink_errors_are_absorbed() {
        let logger = JsonLogger::with_options(LoggerOptions::new().with_output(Broken));
        logger.error("nobody hears this", &[]);
        assert_eq!(logger.flush(), Err(Error::io("closed")));
    }
}
