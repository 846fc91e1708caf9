//! Process-wide logger slot and free-function helpers.
//!
//! The slot starts out holding a default [`JsonLogger`] (info level, stdout),
//! created on first use. [`set_logger`] replaces it, last write wins; install
//! your logger during start-up, before other threads begin logging.
//! [`clear_logger`] empties the slot, after which the helpers do nothing.
//!
//! ## Examples
//!
//! ```rust
//! use json_logger::{fields, global, JsonLogger, LoggerOptions};
//! use std::sync::Arc;
//!
//! global::set_logger(Arc::new(JsonLogger::with_options(
//!     LoggerOptions::new().with_output(std::io::sink()),
//! )));
//!
//! global::info("service started", &[&fields!("port": 8080)]);
//! ```

use crate::logger::{JsonLogger, Logger};
use crate::FieldMap;
use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};

type Slot = RwLock<Option<Arc<dyn Logger>>>;

static SLOT: OnceLock<Slot> = OnceLock::new();

fn slot() -> &'static Slot {
    SLOT.get_or_init(|| RwLock::new(Some(Arc::new(JsonLogger::new()))))
}

/// Installs `logger` for the helper functions, replacing any previous one.
pub fn set_logger(logger: Arc<dyn Logger>) {
    *slot().write() = Some(logger);
}

/// Empties the slot. Helper calls are dropped until a logger is installed.
pub fn clear_logger() {
    *slot().write() = None;
}

/// Returns the installed logger, if any.
#[must_use]
pub fn logger() -> Option<Arc<dyn Logger>> {
    slot().read().clone()
}

// The lock is released before logging so a slow sink never blocks
// `set_logger`.
fn with_logger(f: impl FnOnce(&dyn Logger)) {
    if let Some(logger) = logger() {
        f(logger.as_ref());
    }
}

pub fn debug(message: &str, fields: &[&FieldMap]) {
    with_logger(|logger| logger.debug(message, fields));
}

pub fn info(message: &str, fields: &[&FieldMap]) {
    with_logger(|logger| logger.info(message, fields));
}

pub fn warn(message: &str, fields: &[&FieldMap]) {
    with_logger(|logger| logger.warn(message, fields));
}

pub fn error(message: &str, fields: &[&FieldMap]) {
    with_logger(|logger| logger.error(message, fields));
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, String, usize)>>);

    impl Recorder {
        fn record(&self, level: &str, message: &str, fields: &[&FieldMap]) {
            let count = fields.iter().map(|f| f.len()).sum();
            self.0
                .lock()
                .push((level.to_string(), message.to_string(), count));
        }
    }

    impl Logger for Recorder {
        fn debug(&self, message: &str, fields: &[&FieldMap]) {
            self.record("debug", message, fields);
        }

        fn info(&self, message: &str, fields: &[&FieldMap]) {
            self.record("info", message, fields);
        }

        fn warn(&self, message: &str, fields: &[&FieldMap]) {
            self.record("warn", message, fields);
        }

        fn error(&self, message: &str, fields: &[&FieldMap]) {
            self.record("error", message, fields);
        }
    }

    // One test touches the slot so parallel tests cannot race on it.
    #[test]
    fn test_slot_lifecycle() {
        assert!(logger().is_some());

        let recorder = Arc::new(Recorder::default());
        set_logger(recorder.clone());

        let fields = FieldMap::from([("port", 8080)]);
        debug("d", &[]);
        info("i", &[&fields]);
        warn("w", &[&fields, &fields]);
        error("e", &[]);

        assert_eq!(
            *recorder.0.lock(),
            vec![
                ("debug".to_string(), "d".to_string(), 0),
                ("info".to_string(), "i".to_string(), 1),
                ("warn".to_string(), "w".to_string(), 2),
                ("error".to_string(), "e".to_string(), 0),
            ]
        );

        clear_logger();
        assert!(logger().is_none());
        info("dropped", &[]);
        assert_eq!(recorder.0.lock().len(), 4);
    }
}
