//! Polars `AnyValue` helpers.

use polars::prelude::*;

/// Extracts a numeric cell as `f64`.
///
/// Integer and float types convert directly; strings are parsed. Returns
/// `None` for nulls, booleans and anything that is not a finite number.
pub fn cell_f64(value: AnyValue<'_>) -> Option<f64> {
    let number = match value {
        AnyValue::Int8(v) => f64::from(v),
        AnyValue::Int16(v) => f64::from(v),
        AnyValue::Int32(v) => f64::from(v),
        AnyValue::Int64(v) => v as f64,
        AnyValue::UInt8(v) => f64::from(v),
        AnyValue::UInt16(v) => f64::from(v),
        AnyValue::UInt32(v) => f64::from(v),
        AnyValue::UInt64(v) => v as f64,
        AnyValue::Float32(v) => f64::from(v),
        AnyValue::Float64(v) => v,
        AnyValue::String(s) => return parse_number(s),
        AnyValue::StringOwned(s) => return parse_number(&s),
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Extracts an integer cell, accepting integral floats and numeric strings.
pub fn cell_i64(value: AnyValue<'_>) -> Option<i64> {
    match value {
        AnyValue::Int8(v) => Some(i64::from(v)),
        AnyValue::Int16(v) => Some(i64::from(v)),
        AnyValue::Int32(v) => Some(i64::from(v)),
        AnyValue::Int64(v) => Some(v),
        AnyValue::UInt8(v) => Some(i64::from(v)),
        AnyValue::UInt16(v) => Some(i64::from(v)),
        AnyValue::UInt32(v) => Some(i64::from(v)),
        AnyValue::UInt64(v) => i64::try_from(v).ok(),
        AnyValue::String(s) => parse_identifier(s),
        AnyValue::StringOwned(s) => parse_identifier(&s),
        other => cell_f64(other).and_then(integral),
    }
}

/// Parses a trimmed decimal number. Empty strings and non-finite values yield `None`.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses an identifier such as `subject_id` or `hadm_id`.
///
/// Exports from spreadsheet tools sometimes write integer keys as `123.0`;
/// those are accepted as long as the fractional part is zero.
///
/// ```
/// use los_common::parse_identifier;
///
/// assert_eq!(parse_identifier(" 145834 "), Some(145834));
/// assert_eq!(parse_identifier("145834.0"), Some(145834));
/// assert_eq!(parse_identifier("145834.5"), None);
/// assert_eq!(parse_identifier(""), None);
/// ```
pub fn parse_identifier(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| parse_number(trimmed).and_then(integral))
}

/// Formats a metric with a fixed number of decimals for display tables.
pub fn format_metric(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    format!("{value:.decimals$}")
}

fn integral(value: f64) -> Option<i64> {
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}
