// SPDX-FileCopyrightText: 2026 Parceldesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Timestamp formatting and parsing helpers.
//!
//! All timestamps are stored as `%Y-%m-%dT%H:%M:%S%.3fZ` strings in UTC,
//! matching SQLite's `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`. The fixed
//! format keeps lexicographic string comparison equivalent to chronological
//! comparison, both in Rust and in SQL.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::DeskError;

/// Format used for every stored timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Format a UTC instant as a stored timestamp string.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp string.
///
/// Accepts full RFC 3339 timestamps and, as a convenience for date-only
/// inputs such as due-before dates, plain `YYYY-MM-DD` (taken as UTC
/// midnight).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DeskError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(DateTime::from_naive_utc_and_offset(
            date.and_hms_opt(0, 0, 0).expect("midnight is valid"),
            Utc,
        ));
    }
    Err(DeskError::Validation(format!(
        "invalid timestamp: {value}"
    )))
}

/// Normalize an input timestamp to the stored format.
pub fn normalize_timestamp(value: &str) -> Result<String, DeskError> {
    parse_timestamp(value).map(format_timestamp)
}
