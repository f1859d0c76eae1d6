//! Defensive numeric coercion.
//!
//! Values crossing a loose boundary (CSV cells, JSON payloads, placeholder
//! strings) are parsed into `Option<f64>`. Anything that is not a finite
//! number becomes `None`; nothing here returns an error.

use serde_json::Value;

/// Keep finite values, drop NaN and infinities.
pub fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Parse a text cell. Accepts surrounding whitespace, thousands separators
/// and a trailing `%`. Blank cells and placeholders (`N/A`, `null`, `-`)
/// are absent.
pub fn parse_str(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    if trimmed.is_empty() {
        return None;
    }
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().and_then(finite)
}

/// Parse a JSON value: numbers and numeric strings are accepted.
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().and_then(finite),
        Value::String(s) => parse_str(s),
        _ => None,
    }
}

/// Round to two decimals, judged on the exact binary value, ties to even.
///
/// `0.125` and `78.125` are exact ties and round down to the even cent;
/// `2.675` is stored just below the tie and also rounds down.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    // Only multiples of 1/8 with an odd numerator sit exactly on a half cent.
    let eighths = value * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        let lower = (value * 100.0).floor();
        let even = if lower % 2.0 == 0.0 { lower } else { lower + 1.0 };
        return even / 100.0;
    }
    // Away from a tie the formatter rounds the exact value correctly.
    format!("{value:.2}").parse().unwrap_or(value)
}
