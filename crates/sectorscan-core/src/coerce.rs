//! Defensive numeric coercion for remote payload fields.
//!
//! The remote source encodes most numbers as JSON strings and uses the
//! literal markers `"None"` and `"-"` for unknown values. A field that is
//! missing, non-numeric, or marked unknown coerces to `None`, never to zero.

use serde_json::Value;

/// Parses a payload field into a number, treating unknown markers as absent.
#[must_use]
pub fn parse_numeric(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if is_unknown_marker(s) {
                None
            } else {
                s.parse().ok()
            }
        }
        _ => None,
    }
}

/// Reads a string-valued field, treating unknown markers as absent.
#[must_use]
pub fn parse_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let s = s.trim();
            if is_unknown_marker(s) {
                None
            } else {
                Some(s.to_string())
            }
        }
        _ => None,
    }
}

/// Rounds to two decimal places, the precision used for derived ratios.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn is_unknown_marker(s: &str) -> bool {
    s.is_empty() || s == "-" || s.eq_ignore_ascii_case("none")
}
