use chrono::DateTime;
use json_logger::{
    fields, FieldMap, Format, JsonLogger, Level, Logger, LoggerOptions, Value,
};
use serde::Serialize;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;

/// Sink shared between the logger and the test.
#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    fn lines(&self) -> Vec<serde_json::Value> {
        self.text()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

impl Write for SharedSink {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn payments_logger(sink: &SharedSink) -> JsonLogger {
    JsonLogger::with_options(
        LoggerOptions::new()
            .with_level(Level::Info)
            .with_output(sink.clone())
            .with_base_field("service", "payments"),
    )
}

#[test]
fn test_charge_succeeded_entry() {
    let sink = SharedSink::default();
    let logger = payments_logger(&sink);

    logger.info(
        "charge succeeded",
        &[&fields!("amount": 42, "currency": "USD")],
    );

    let text = sink.text();
    assert!(text.ends_with('\n'));
    assert_eq!(text.lines().count(), 1);

    let entries = sink.lines();
    let entry = &entries[0];
    let timestamp = entry["timestamp"].as_str().unwrap();
    assert!(DateTime::parse_from_rfc3339(timestamp).is_ok());
    assert!(timestamp.ends_with('Z'));
    assert_eq!(entry["level"], "info");
    assert_eq!(entry["message"], "charge succeeded");
    assert_eq!(entry["service"], "payments");
    assert_eq!(entry["amount"], 42);
    assert_eq!(entry["currency"], "USD");
    assert!(entry.get("error").is_none());
}

#[test]
fn test_unsupported_field_degrades() {
    let sink = SharedSink::default();
    let logger = payments_logger(&sink);

    let (tx, _rx) = std::sync::mpsc::channel::<u8>();
    logger.info("odd", &[&fields!("c": Value::unsupported(&tx))]);

    let entries = sink.lines();
    let entry = &entries[0];
    assert!(!entry["c"].as_str().unwrap().is_empty());
    assert!(!entry["error"].as_str().unwrap().is_empty());
    assert_eq!(entry["service"], "payments");
}

#[test]
fn test_level_filtering() {
    let sink = SharedSink::default();
    let logger = JsonLogger::with_options(
        LoggerOptions::new()
            .with_level(Level::Warn)
            .with_output(sink.clone()),
    );

    logger.debug("d", &[]);
    logger.info("i", &[]);
    assert!(sink.text().is_empty());

    logger.warn("w", &[]);
    logger.error("e", &[]);
    let levels: Vec<_> = sink
        .lines()
        .iter()
        .map(|entry| entry["level"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(levels, vec!["warn", "error"]);
}

#[test]
fn test_concurrent_entries_never_interleave() {
    let sink = SharedSink::default();
    let logger = Arc::new(payments_logger(&sink));

    let handles: Vec<_> = (0..2)
        .map(|worker| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..1000 {
                    logger.info(
                        "tick",
                        &[&fields!("worker": worker, "i": i, "pad": "x".repeat(64))],
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let entries = sink.lines();
    assert_eq!(entries.len(), 2000);
    for worker in 0..2 {
        let count = entries.iter().filter(|e| e["worker"] == worker).count();
        assert_eq!(count, 1000);
    }
}

#[test]
fn test_later_maps_override() {
    let sink = SharedSink::default();
    let logger = payments_logger(&sink);

    let first = fields!("attempt": 1, "service": "override");
    let second = fields!("\"attempt\":": 2);
    logger.info("retry", &[&first, &second]);

    let text = sink.text();
    assert_eq!(text.matches("\"attempt\"").count(), 1);
    let entry = &sink.lines()[0];
    assert_eq!(entry["attempt"], 2);
    assert_eq!(entry["service"], "override");
}

#[test]
fn test_nested_structures_round_trip() {
    #[derive(Debug, Serialize)]
    struct Item {
        sku: &'static str,
        #[serde(rename = "qty")]
        quantity: u32,
        #[serde(skip)]
        internal_note: &'static str,
    }

    let sink = SharedSink::default();
    let logger = payments_logger(&sink);

    let mut fields = FieldMap::new();
    fields.insert(
        "order",
        json_logger::value!({"lines": [{"n": 1}, {"n": 2}], "total": 9.5}),
    );
    fields.insert(
        "item",
        Value::reflect(Item {
            sku: "W-1",
            quantity: 3,
            internal_note: "hidden",
        }),
    );
    logger.info("order placed", &[&fields]);

    let entry = &sink.lines()[0];
    assert_eq!(
        entry["order"],
        serde_json::json!({"lines": [{"n": 1}, {"n": 2}], "total": 9.5})
    );
    assert_eq!(entry["item"], serde_json::json!({"sku": "W-1", "qty": 3}));
    assert!(entry.get("error").is_none());
}

#[test]
fn test_pretty_entries_parse() {
    let sink = SharedSink::default();
    let logger = JsonLogger::with_options(
        LoggerOptions::new()
            .with_output(sink.clone())
            .with_format(Format::pretty()),
    );

    logger.info("pretty", &[&fields!("k": "v")]);

    let text = sink.text();
    assert!(text.starts_with("{\n  \"timestamp\": "));
    assert!(text.ends_with("\n}\n"));
    let entry: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(entry["k"], "v");
}

#[test]
fn test_custom_time_format() {
    let sink = SharedSink::default();
    let logger = JsonLogger::with_options(
        LoggerOptions::new()
            .with_output(sink.clone())
            .with_custom_time_format("%Y-%m-%d"),
    );

    logger.info("dated", &[]);

    let entry = &sink.lines()[0];
    let timestamp = entry["timestamp"].as_str().unwrap();
    assert_eq!(timestamp.len(), 10);
    assert!(chrono::NaiveDate::parse_from_str(timestamp, "%Y-%m-%d").is_ok());
}

#[test]
fn test_message_escaping() {
    let sink = SharedSink::default();
    let logger = payments_logger(&sink);

    let message = "line1\nline2\t\"quoted\" \\ \u{1}";
    logger.error(message, &[]);

    let text = sink.text();
    assert_eq!(text.lines().count(), 1);
    assert_eq!(sink.lines()[0]["message"], message);
}

#[test]
fn test_reserved_names_are_not_repeated() {
    let sink = SharedSink::default();
    let logger = payments_logger(&sink);

    logger.info(
        "real",
        &[&fields!("level": "spoof", "'message':": "x", "timestamp": 0, "kept": true)],
    );

    let text = sink.text();
    assert_eq!(text.matches("\"level\"").count(), 1);
    assert_eq!(text.matches("\"message\"").count(), 1);
    assert_eq!(text.matches("\"timestamp\"").count(), 1);

    let entry = &sink.lines()[0];
    assert_eq!(entry["level"], "info");
    assert_eq!(entry["message"], "real");
    assert_eq!(entry["kept"], true);
}
