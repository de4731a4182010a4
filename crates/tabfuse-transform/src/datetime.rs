//! Date/time string parsing shared by the date transformations.
//!
//! Input columns usually arrive as text in whatever format the source
//! system produced. Parsing tries a fixed list of common formats, full
//! datetimes before date-only ones, so `2024-01-15 10:30:00` keeps its
//! time component instead of truncating to midnight.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Parse a date/time string by trying common formats in order.
///
/// Returns `None` for empty or unrecognized input. Date-only matches are
/// promoted to midnight.
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    try_parse_datetime(trimmed).or_else(|| try_parse_date(trimmed).map(midnight))
}

/// Parse a date/time string with an explicit chrono format string.
///
/// The format is tried as a full datetime first and then as a date-only
/// pattern, so `%Y-%m-%d` works without a time component.
pub fn parse_with_format(value: &str, format: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(trimmed, format).ok().map(midnight)
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn try_parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];

    for fmt in &formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }

    None
}

fn try_parse_date(value: &str) -> Option<NaiveDate> {
    // US order ahead of European, so 03/04/2024 reads as March 4.
    let formats = [
        "%Y-%m-%d",
        "%m/%d/%Y",
        "%d/%m/%Y",
        "%Y/%m/%d",
        "%d-%b-%Y",
        "%b %d, %Y",
        "%B %d, %Y",
        "%Y%m%d",
        "%d.%m.%Y",
        "%m-%d-%Y",
    ];

    for fmt in &formats {
        if let Ok(d) = NaiveDate::parse_from_str(value, fmt) {
            return Some(d);
        }
    }

    None
}
