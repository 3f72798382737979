//! Database utility functions.
//!
//! Timestamps are stored as RFC 3339 TEXT; parsing also accepts
//! SQLite's default datetime format so externally edited rows load.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Parse a datetime from RFC 3339 or SQLite's default format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // SQLite default: "YYYY-MM-DD HH:MM:SS", interpreted as UTC
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }

    DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc))
}
