//! Cross-dialect value normalization.
//!
//! Makes values comparable despite different native types, date formats,
//! and fractional-second precision across engines. The canonical forms:
//!
//! - date-only values: `yyyy-MM-dd`
//! - timestamps: `yyyy-MM-dd HH:mm:ss` with trailing zero fractional
//!   seconds stripped; a timestamp at exactly midnight collapses to the
//!   date-only form, so `2023-01-01 00:00:00.0` and `2023-01-01` compare
//!   equal
//! - everything else passes through unchanged (strings trimmed)
//!
//! Normalization is total and idempotent: it never fails, and applying it
//! twice yields the same value as applying it once. Parse errors fall back
//! to the trimmed original string.

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::Value;

/// Timestamp patterns tried against string values, in order. The first
/// successful parse wins. `%.f` also accepts the bare seconds form, so the
/// canonical output of a previous pass always re-parses.
const DATETIME_PATTERNS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Shape of phone-number-like strings: digit groups separated by hyphens
/// (e.g. `977-86-77`). Dates share this shape, so the shape alone is not
/// decisive; see [`is_phone_like`].
static PHONE_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{3,4}-\d{2}-\d{2}").expect("phone shape regex"));

/// Canonicalize a scalar value for comparison.
pub fn normalize(value: &Value) -> Value {
    match value {
        Value::Null => Value::Null,
        Value::Date(d) => Value::Text(d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => Value::Text(canonical_datetime(*dt)),
        Value::Text(s) => normalize_str(s),
        // Numbers and booleans pass through unchanged.
        other => other.clone(),
    }
}

fn normalize_str(s: &str) -> Value {
    let trimmed = s.trim();

    // Phone numbers that resemble dates must not be reformatted.
    if is_phone_like(trimmed) {
        return Value::Text(trimmed.to_string());
    }

    match parse_temporal(trimmed) {
        Some(canonical) => Value::Text(canonical),
        None => Value::Text(trimmed.to_string()),
    }
}

/// True for strings that look like hyphenated phone numbers and do not
/// read as a calendar value. `2023-01-01` matches the digit-group shape
/// too, but a string that parses as a real date is treated as temporal:
/// the shape cannot distinguish the two, and equal instants must compare
/// equal across dialects.
fn is_phone_like(s: &str) -> bool {
    PHONE_SHAPE.is_match(s) && parse_temporal(s).is_none()
}

/// Try the temporal patterns in order; return the canonical rendering of
/// the first match.
fn parse_temporal(s: &str) -> Option<String> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d.format("%Y-%m-%d").to_string());
    }
    for pattern in DATETIME_PATTERNS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(canonical_datetime(dt));
        }
    }
    None
}

/// Canonical rendering of a timestamp. Midnight collapses to the bare
/// date; otherwise seconds precision with any non-zero fraction kept
/// (chrono's `%.f` prints nothing when the fraction is zero).
fn canonical_datetime(dt: NaiveDateTime) -> String {
    let t = dt.time();
    if t.num_seconds_from_midnight() == 0 && t.nanosecond() == 0 {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn norm_text(s: &str) -> String {
        match normalize(&Value::Text(s.to_string())) {
            Value::Text(t) => t,
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_iso_date_passthrough() {
        assert_eq!(norm_text("2023-01-01"), "2023-01-01");
        assert_eq!(norm_text("  2023-01-01  "), "2023-01-01");
    }

    #[test]
    fn test_midnight_timestamp_collapses_to_date() {
        assert_eq!(norm_text("2023-01-01 00:00:00"), "2023-01-01");
        assert_eq!(norm_text("2023-01-01 00:00:00.0"), "2023-01-01");
        assert_eq!(norm_text("2023-01-01T00:00:00.000"), "2023-01-01");
    }

    #[test]
    fn test_timestamp_fraction_handling() {
        // Trailing zero fraction stripped
        assert_eq!(norm_text("2023-06-15 08:30:00.000"), "2023-06-15 08:30:00");
        // Non-zero fraction survives
        assert_eq!(
            norm_text("2023-06-15T08:30:00.250"),
            "2023-06-15 08:30:00.250"
        );
    }

    #[test]
    fn test_phone_numbers_not_reformatted() {
        // Month/day groups out of calendar range: phone, not date
        assert_eq!(norm_text("977-86-77"), "977-86-77");
        assert_eq!(norm_text("0123-45-67 ext 9"), "0123-45-67 ext 9");
        // Valid date shape reads as a date, not a phone number
        assert_eq!(norm_text("2023-01-01"), "2023-01-01");
    }

    #[test]
    fn test_malformed_date_like_strings_pass_through() {
        assert_eq!(norm_text("2023-13-45"), "2023-13-45");
        assert_eq!(norm_text("not a date"), "not a date");
        assert_eq!(norm_text("2023-01-01garbage"), "2023-01-01garbage");
    }

    #[test]
    fn test_native_temporal_values() {
        let d = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert_eq!(
            normalize(&Value::Date(d)),
            Value::Text("2023-01-01".into())
        );

        let dt = d.and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(
            normalize(&Value::DateTime(dt)),
            Value::Text("2023-01-01".into())
        );

        let dt = d.and_hms_opt(9, 15, 0).unwrap();
        assert_eq!(
            normalize(&Value::DateTime(dt)),
            Value::Text("2023-01-01 09:15:00".into())
        );
    }

    #[test]
    fn test_non_temporal_scalars_unchanged() {
        assert_eq!(normalize(&Value::Null), Value::Null);
        assert_eq!(normalize(&Value::Int(42)), Value::Int(42));
        assert_eq!(normalize(&Value::Float(1.5)), Value::Float(1.5));
        assert_eq!(normalize(&Value::Bool(true)), Value::Bool(true));
    }

    #[test]
    fn test_idempotent_for_all_kinds() {
        let inputs = vec![
            Value::Null,
            Value::Int(7),
            Value::Float(3.25),
            Value::Bool(false),
            Value::Text("2023-01-01 00:00:00.0".into()),
            Value::Text("2023-06-15T08:30:00.250".into()),
            Value::Text("977-86-77".into()),
            Value::Text("hello world".into()),
            Value::Text("2023-99-99".into()),
            Value::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
            Value::DateTime(
                NaiveDate::from_ymd_opt(2024, 2, 29)
                    .unwrap()
                    .and_hms_milli_opt(23, 59, 59, 999)
                    .unwrap(),
            ),
        ];

        for v in inputs {
            let once = normalize(&v);
            let twice = normalize(&once);
            assert_eq!(once, twice, "normalize not idempotent for {:?}", v);
        }
    }

    #[test]
    fn test_updated_at_scenario() {
        // Same instant, different precision on each side
        let src = normalize(&Value::Text("2023-01-01 00:00:00.0".into()));
        let tgt = normalize(&Value::Text("2023-01-01".into()));
        assert_eq!(src, tgt);
    }
}
