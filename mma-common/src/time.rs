//! Timestamp utilities
//!
//! CSV exports come from several scrapers, so capture and release dates show up
//! in a handful of textual formats. Everything is normalized to a naive UTC
//! `NaiveDateTime`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Date-time layouts tried after RFC 3339
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts, interpreted as midnight
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Get today's date in UTC
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a capture or release timestamp
///
/// Returns `None` for empty or unrecognized text; callers decide whether that
/// drops the row or merely the field.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Whole days elapsed between `release` and `as_of`
///
/// Negative when the release lies in the future.
pub fn days_since(release: NaiveDateTime, as_of: NaiveDate) -> i64 {
    let as_of = as_of.and_hms_opt(0, 0, 0).unwrap_or(release);
    (as_of - release).num_days()
}
