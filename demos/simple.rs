//! Basic structured logging to stdout.
//!
//! Run with: cargo run --example simple

use json_logger::{fields, global, FieldMap, JsonLogger, Level, Logger, LoggerOptions, Value};
use serde::Serialize;
use std::error::Error;

#[derive(Debug, Serialize)]
struct Card {
    brand: &'static str,
    #[serde(rename = "last_four")]
    last4: &'static str,
}

fn main() -> Result<(), Box<dyn Error>> {
    let logger = JsonLogger::with_options(
        LoggerOptions::new()
            .with_level(Level::Info)
            .with_output(std::io::stdout())
            .with_base_field("service", "payments"),
    );

    logger.info("charge succeeded", &[&fields!("amount": 42, "currency": "USD")]);
    logger.debug("not written at info level", &[]);

    // Any Serialize type can be logged through the reflective path
    let mut card = FieldMap::new();
    card.insert(
        "card",
        Value::reflect(Card {
            brand: "visa",
            last4: "4242",
        }),
    );
    logger.warn("card expiring soon", &[&card]);

    // Values without a JSON form degrade and mark the entry
    let (tx, _rx) = std::sync::mpsc::channel::<u8>();
    logger.error("odd field", &[&fields!("chan": Value::unsupported(&tx))]);

    // Package-level helpers log through the process-wide logger
    global::info("helpers use the default logger", &[]);

    logger.flush()?;
    Ok(())
}
