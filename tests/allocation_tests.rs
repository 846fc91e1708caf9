//! Counts heap allocations made by the logging pipeline.
//!
//! This file holds a single test so that no other test thread allocates
//! while the counter is being read.

use json_logger::{fields, value, JsonLogger, Level, Logger, LoggerOptions, Value};
use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicUsize, Ordering};

struct Counting;

static ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
        System.realloc(ptr, layout, new_size)
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

fn allocations() -> usize {
    ALLOCATIONS.load(Ordering::Relaxed)
}

#[test]
fn test_warm_log_calls_do_not_allocate() {
    let logger = JsonLogger::with_options(
        LoggerOptions::new()
            .with_level(Level::Info)
            .with_output(std::io::sink())
            .with_base_field("service", "payments")
            .with_base_field("tags", value!(["a", "b", "c", "d"])),
    );
    let first = fields!("amount": 42, "currency": "USD", "ratio": 0.25);
    let second = fields!(
        "'currency':": "EUR",
        "order": value!({"lines": [1, 2, 3], "note": "gift"}),
        "missing": Value::Null,
    );

    for _ in 0..10 {
        logger.info("charge succeeded", &[&first, &second]);
        logger.debug("filtered", &[&first]);
    }

    let before = allocations();
    for _ in 0..100 {
        logger.info("charge succeeded", &[&first, &second]);
        logger.debug("filtered", &[&first]);
    }
    let after = allocations();

    assert_eq!(after - before, 0, "log calls allocated once warm");
}
