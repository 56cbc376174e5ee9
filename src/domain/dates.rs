//! Parsing of date-like cells and range bounds.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Integer values above this are read as Unix seconds.
pub const EPOCH_SECONDS_THRESHOLD: f64 = 1e9;

/// Parse `YYYY-MM-DD` or `DD/MM/YYYY`, optionally followed by a time of day.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(ts);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    parse_timestamp(value).map(|ts| ts.date())
}

/// Whole numbers past [`EPOCH_SECONDS_THRESHOLD`] as UTC timestamps.
pub fn from_epoch_seconds(value: f64) -> Option<NaiveDateTime> {
    if !value.is_finite() || value.fract() != 0.0 || value <= EPOCH_SECONDS_THRESHOLD {
        return None;
    }
    DateTime::from_timestamp(value as i64, 0).map(|dt| dt.naive_utc())
}
