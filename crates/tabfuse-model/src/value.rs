//! Cell-level value helpers shared across the pipeline stages.
//!
//! Conversions between polars `AnyValue` cells and plain Rust values, plus
//! the display formatting rules used for composite keys and export.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::{AnyValue, DataFrame, DataType, TimeUnit};

// Days from 0001-01-01 (CE) to the Unix epoch; polars date cells count
// days from the epoch while chrono counts from CE.
const EPOCH_CE_DAYS: i32 = 719_163;

/// Converts a polars cell value to its display string.
///
/// Missing cells render as the empty string, floats drop trailing zeros and
/// timestamps render as ISO 8601.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => if b { "true" } else { "false" }.to_string(),
        AnyValue::Datetime(v, unit, _) => match timestamp_to_datetime(v, unit) {
            Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            None => String::new(),
        },
        AnyValue::DatetimeOwned(v, unit, _) => match timestamp_to_datetime(v, unit) {
            Some(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            None => String::new(),
        },
        AnyValue::Date(days) => match date_from_epoch_days(days) {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => String::new(),
        },
        other => other.to_string(),
    }
}

/// Formats a floating-point number as a string without trailing zeros.
pub fn format_numeric(v: f64) -> String {
    let s = format!("{v}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Converts an AnyValue to f64, returning None for non-numeric or null values.
///
/// Strings are parsed when possible; booleans coerce to 1.0/0.0.
pub fn any_to_f64(value: &AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(*v)),
        AnyValue::Int16(v) => Some(f64::from(*v)),
        AnyValue::Int32(v) => Some(f64::from(*v)),
        AnyValue::Int64(v) => Some(*v as f64),
        AnyValue::UInt8(v) => Some(f64::from(*v)),
        AnyValue::UInt16(v) => Some(f64::from(*v)),
        AnyValue::UInt32(v) => Some(f64::from(*v)),
        AnyValue::UInt64(v) => Some(*v as f64),
        AnyValue::Float32(v) => Some(f64::from(*v)),
        AnyValue::Float64(v) => Some(*v),
        AnyValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(s),
        _ => None,
    }
}

/// Extracts a timestamp cell as a NaiveDateTime; date cells map to midnight.
pub fn any_to_datetime(value: &AnyValue<'_>) -> Option<NaiveDateTime> {
    match value {
        AnyValue::Datetime(v, unit, _) => timestamp_to_datetime(*v, *unit),
        AnyValue::DatetimeOwned(v, unit, _) => timestamp_to_datetime(*v, *unit),
        AnyValue::Date(days) => {
            date_from_epoch_days(*days).and_then(|date| date.and_hms_opt(0, 0, 0))
        }
        _ => None,
    }
}

/// Converts a raw polars timestamp to a NaiveDateTime.
pub fn timestamp_to_datetime(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let utc = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    };
    utc.map(|dt| dt.naive_utc())
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days + EPOCH_CE_DAYS)
}

/// Parses a string as f64, returning None for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

/// Parses common boolean spellings, returning None for anything else.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Whether a column dtype participates in numeric fills and scaling.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Get a string value from a DataFrame column at the given row index.
///
/// Missing columns and missing cells both yield the empty string.
pub fn column_value_string(df: &DataFrame, name: &str, idx: usize) -> String {
    match df.column(name) {
        Ok(column) => any_to_string(column.get(idx).unwrap_or(AnyValue::Null)),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stringifies_scalars() {
        assert_eq!(any_to_string(AnyValue::Null), "");
        assert_eq!(any_to_string(AnyValue::Int64(42)), "42");
        assert_eq!(any_to_string(AnyValue::Float64(2.50)), "2.5");
        assert_eq!(any_to_string(AnyValue::Float64(3.0)), "3");
        assert_eq!(any_to_string(AnyValue::Float64(30.0)), "30");
        assert_eq!(any_to_string(AnyValue::Boolean(true)), "true");
        assert_eq!(any_to_string(AnyValue::String("abc")), "abc");
    }

    #[test]
    fn stringifies_timestamps_iso8601() {
        // 2024-01-15T10:30:45 UTC in milliseconds
        let ms = 1_705_314_645_000i64;
        let value = AnyValue::Datetime(ms, TimeUnit::Milliseconds, None);
        assert_eq!(any_to_string(value), "2024-01-15T10:30:45");
    }

    #[test]
    fn numeric_extraction() {
        assert_eq!(any_to_f64(&AnyValue::Int64(7)), Some(7.0));
        assert_eq!(any_to_f64(&AnyValue::String("3.5")), Some(3.5));
        assert_eq!(any_to_f64(&AnyValue::String("abc")), None);
        assert_eq!(any_to_f64(&AnyValue::Null), None);
        assert_eq!(any_to_f64(&AnyValue::Boolean(true)), Some(1.0));
    }

    #[test]
    fn bool_parsing() {
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool(" 0 "), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn epoch_day_conversion() {
        let date = date_from_epoch_days(0).unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "1970-01-01");
        let date = date_from_epoch_days(19_737).unwrap();
        assert_eq!(date.format("%Y-%m-%d").to_string(), "2024-01-15");
    }

    #[test]
    fn numeric_dtypes() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }
}
