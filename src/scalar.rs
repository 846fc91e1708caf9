//! JSON scalar primitives.
//!
//! Everything in this module appends to a caller-owned `Vec<u8>` and never
//! allocates an intermediate `String`:
//!
//! - [`quote`]: byte-oriented JSON string quoting
//! - [`format_int`] / [`format_uint`]: base-10 integers through a stack buffer
//! - [`format_f32`] / [`format_f64`]: shortest round-trip floats
//! - [`write_timestamp`]: UTC RFC 3339 with nanoseconds, always quoted
//!
//! ## Examples
//!
//! ```rust
//! use json_logger::scalar::{format_int, quote};
//!
//! let mut buf = Vec::new();
//! quote(&mut buf, "tab\there");
//! buf.push(b':');
//! format_int(&mut buf, i64::MIN);
//!
//! assert_eq!(buf, br#""tab\there":-9223372036854775808"#);
//! ```

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::fmt;
use std::io::Write;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Digits in `u64::MAX`.
const MAX_DIGITS: usize = 20;

/// Appends `s` as a double-quoted JSON string.
///
/// Backslash, double quote, newline, carriage return and tab get their short
/// escapes; every other byte below `0x20` becomes `\u00XX` with lowercase hex.
/// All other bytes are copied through untouched, so multi-byte UTF-8
/// sequences are never re-encoded.
pub fn quote(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    buf.reserve(bytes.len() + 2);
    buf.push(b'"');

    let mut start = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let short: &[u8] = match byte {
            b'\\' => b"\\\\",
            b'"' => b"\\\"",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            0x00..=0x1f => {
                buf.extend_from_slice(&bytes[start..i]);
                buf.extend_from_slice(&[
                    b'\\',
                    b'u',
                    b'0',
                    b'0',
                    HEX[usize::from(byte >> 4)],
                    HEX[usize::from(byte & 0x0f)],
                ]);
                start = i + 1;
                continue;
            }
            _ => continue,
        };
        buf.extend_from_slice(&bytes[start..i]);
        buf.extend_from_slice(short);
        start = i + 1;
    }

    buf.extend_from_slice(&bytes[start..]);
    buf.push(b'"');
}

/// Appends `v` in base 10.
///
/// The magnitude is taken as `u64`, so `i64::MIN` needs no special case.
#[inline]
pub fn format_int(buf: &mut Vec<u8>, v: i64) {
    if v < 0 {
        buf.push(b'-');
    }
    format_uint(buf, v.unsigned_abs());
}

/// Appends `v` in base 10.
#[inline]
pub fn format_uint(buf: &mut Vec<u8>, v: u64) {
    if v == 0 {
        buf.push(b'0');
        return;
    }

    let mut digits = [0u8; MAX_DIGITS];
    let start = fill_digits(&mut digits, v);
    buf.extend_from_slice(&digits[start..]);
}

/// Writes the digits of `v` right-aligned into `digits`, returning the index
/// of the first written digit.
#[inline]
fn fill_digits(digits: &mut [u8; MAX_DIGITS], mut v: u64) -> usize {
    let mut pos = MAX_DIGITS;
    loop {
        pos -= 1;
        digits[pos] = b'0' + (v % 10) as u8;
        v /= 10;
        if v == 0 {
            return pos;
        }
    }
}

fn format_padded(buf: &mut Vec<u8>, v: u64, width: usize) {
    let mut digits = [b'0'; MAX_DIGITS];
    let start = fill_digits(&mut digits, v).min(MAX_DIGITS - width);
    buf.extend_from_slice(&digits[start..]);
}

#[inline]
fn uses_exponent(abs: f64) -> bool {
    abs >= 1e21 || (abs != 0.0 && abs < 1e-6)
}

/// Appends the shortest decimal form of `v` that round-trips through `f64`.
///
/// NaN and infinities have no JSON representation and are written as `null`.
pub fn format_f64(buf: &mut Vec<u8>, v: f64) {
    if !v.is_finite() {
        buf.extend_from_slice(b"null");
        return;
    }
    // Writing into a Vec<u8> cannot fail.
    let _ = if uses_exponent(v.abs()) {
        write!(buf, "{:e}", v)
    } else {
        write!(buf, "{}", v)
    };
}

/// Appends the shortest decimal form of `v` that round-trips through `f32`.
pub fn format_f32(buf: &mut Vec<u8>, v: f32) {
    if !v.is_finite() {
        buf.extend_from_slice(b"null");
        return;
    }
    let _ = if uses_exponent(f64::from(v.abs())) {
        write!(buf, "{:e}", v)
    } else {
        write!(buf, "{}", v)
    };
}

/// Appends `ts` as a quoted UTC timestamp, e.g. `"2024-01-01T12:00:00.5Z"`.
pub fn write_timestamp(buf: &mut Vec<u8>, ts: &DateTime<Utc>) {
    buf.push(b'"');
    write_rfc3339_nano(buf, ts);
    buf.push(b'"');
}

/// RFC 3339 with up to nine fractional digits, trailing zeros trimmed and
/// the fraction omitted entirely on whole seconds.
fn write_rfc3339_nano(buf: &mut Vec<u8>, ts: &DateTime<Utc>) {
    let year = ts.year();
    if year < 0 {
        buf.push(b'-');
    }
    format_padded(buf, u64::from(year.unsigned_abs()), 4);
    buf.push(b'-');
    format_padded(buf, u64::from(ts.month()), 2);
    buf.push(b'-');
    format_padded(buf, u64::from(ts.day()), 2);
    buf.push(b'T');
    format_padded(buf, u64::from(ts.hour()), 2);
    buf.push(b':');
    format_padded(buf, u64::from(ts.minute()), 2);
    buf.push(b':');
    format_padded(buf, u64::from(ts.second()), 2);

    // chrono folds leap seconds into the nanosecond field
    let nanos = ts.nanosecond() % 1_000_000_000;
    if nanos != 0 {
        let mut digits = [b'0'; 9];
        let mut rest = nanos;
        for slot in digits.iter_mut().rev() {
            *slot = b'0' + (rest % 10) as u8;
            rest /= 10;
        }
        let trailing = digits.iter().rev().take_while(|&&d| d == b'0').count();
        buf.push(b'.');
        buf.extend_from_slice(&digits[..9 - trailing]);
    }
    buf.push(b'Z');
}

/// Display adapter producing the same text as [`write_timestamp`], unquoted.
///
/// # Examples
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use json_logger::scalar::Rfc3339Nano;
///
/// let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
/// assert_eq!(Rfc3339Nano(&ts).to_string(), "2024-01-01T12:00:00Z");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Rfc3339Nano<'a>(pub &'a DateTime<Utc>);

impl fmt::Display for Rfc3339Nano<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::with_capacity(32);
        write_rfc3339_nano(&mut buf, self.0);
        f.write_str(std::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}
