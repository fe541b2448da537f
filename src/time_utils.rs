//! Time Utilities
//!
//! Parsing of dataset timestamps and caller-supplied instants. Everything is
//! converted to `DateTime<Utc>` at the edges so comparisons inside the engine
//! never mix local and UTC time.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Layout of timestamps in Club Log files ("2014-03-01T00:00:00+00:00")
const DATASET_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a dataset timestamp
///
/// Only the first 19 characters are read; offset or fraction suffixes are
/// ignored and the value is taken as UTC.
pub fn parse_dataset_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let clean = raw.trim();
    let head = clean.get(..19)?;
    NaiveDateTime::parse_from_str(head, DATASET_TIMESTAMP_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

/// Parse a caller-supplied instant
///
/// Accepts RFC 3339 with an explicit offset (converted to UTC) or a bare
/// `YYYY-MM-DD` date, which means midnight UTC. Naive date-times such as
/// "2020-01-01T12:00:00" are rejected because their zone is unknown.
pub fn parse_utc_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let clean = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(clean) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(clean, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    if NaiveDateTime::parse_from_str(clean, DATASET_TIMESTAMP_FORMAT).is_ok() {
        return Err(format!(
            "timestamp '{}' has no UTC offset; append 'Z' or '+00:00'",
            clean
        ));
    }
    Err(format!("invalid timestamp '{}', expected RFC 3339", clean))
}

/// Year/month/day/hour/minute query parameters for the Club Log API
pub fn api_time_params(at: DateTime<Utc>) -> [(&'static str, String); 5] {
    [
        ("year", at.format("%Y").to_string()),
        ("month", at.format("%m").to_string()),
        ("day", at.format("%d").to_string()),
        ("hour", at.format("%H").to_string()),
        ("minute", at.format("%M").to_string()),
    ]
}
