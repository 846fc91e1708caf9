//! Pretty output, a custom time format and per-call overrides.
//!
//! Run with: cargo run --example custom_options

use json_logger::{
    fields, global, value, Format, JsonLogger, Level, Logger, LoggerOptions, PrettyJsonLogWriter,
};
use std::error::Error;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn Error>> {
    let level: Level = "debug".parse()?;

    let pretty = JsonLogger::with_options(
        LoggerOptions::new()
            .with_level(level)
            .with_output(std::io::stdout())
            .with_format(Format::pretty())
            .with_custom_time_format("%Y-%m-%d %H:%M:%S")
            .with_base_fields(&fields!("service": "checkout", "region": "eu")),
    );

    // Later maps win, and noisy keys are normalized first
    pretty.debug(
        "cart updated",
        &[
            &fields!("items": value!([{"sku": "W-1", "qty": 2}]), "region": "us"),
            &fields!("'region':": "ap"),
        ],
    );

    let tabbed = JsonLogger::with_options(
        LoggerOptions::new()
            .with_output(std::io::stdout())
            .with_writer(PrettyJsonLogWriter::new("\t")),
    );
    tabbed.info("tab indented", &[&fields!("ok": true)]);

    // Install a logger for the package-level helpers
    global::set_logger(Arc::new(pretty));
    global::warn("through the global slot", &[&fields!("attempt": 3)]);

    global::clear_logger();
    global::error("dropped: no logger installed", &[]);

    Ok(())
}
