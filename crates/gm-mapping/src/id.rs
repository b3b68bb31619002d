//! Mapping id assignment.
//!
//! Two schemes are in use and both are collision-prone:
//!
//! - Single adds use `<epoch millis>-<name>`. Two adds of the same name in
//!   the same millisecond produce the same id.
//! - Bulk adds use `<largest numeric id> + <1-based line position>`. Ids are
//!   read the way the remote store's web client reads them: blank ids count
//!   as `0` and any id that is not a number is ignored. When no id is
//!   numeric the base is NaN and every bulk id becomes `"NaN"`.
//!
//! Collisions are not prevented here. [`add_many`](crate::store::add_many)
//! rejects any candidate whose id is already taken.

use chrono::{DateTime, Utc};
use gm_model::MappingRecord;

/// Returns the id for a record added on its own.
#[must_use]
pub fn single_record_id(now: DateTime<Utc>, name: &str) -> String {
    format!("{}-{}", now.timestamp_millis(), name)
}

/// Returns the base that bulk ids are counted up from.
///
/// This is the largest numeric id in `existing`, or NaN if there is none.
#[must_use]
pub fn bulk_id_base(existing: &[MappingRecord]) -> f64 {
    existing
        .iter()
        .filter_map(|record| numeric_value(&record.id))
        .fold(f64::NAN, f64::max)
}

/// Returns the id of the bulk line at 1-based `line_position`.
#[must_use]
pub fn bulk_record_id(base: f64, line_position: usize) -> String {
    let value = base + line_position as f64;
    format_number(value)
}

/// Reads an id as a number.
///
/// Surrounding whitespace is ignored and a blank id reads as `0`. Decimal,
/// exponent, `0x`/`0o`/`0b` and `Infinity` forms are accepted.
fn numeric_value(id: &str) -> Option<f64> {
    let s = id.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            // `from_str_radix` takes a sign; a prefixed literal never has one.
            if digits.starts_with('+') {
                return None;
            }
            return u128::from_str_radix(digits, radix).ok().map(|v| v as f64);
        }
    }

    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    // `parse::<f64>` also accepts "inf" and "nan"; those are not ids.
    if !s
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }
    s.parse::<f64>().ok()
}

/// Formats a number the way the id was historically rendered.
fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let rendered = format!("{value:e}");
        return match rendered.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => rendered,
        };
    }
    // Shortest round-trip digits, zero-padded for large integers.
    format!("{value}")
}
