//! Publish timestamp rendering and parsing.

use chrono::{DateTime, NaiveDate, Utc};

// RFC 2822 with a zero-padded day, e.g. `Thu, 01 Jan 2009 00:00:00 +0000`.
const PUBLISHED_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// Renders unix seconds as a human-readable RFC 2822 timestamp.
///
/// Returns `None` when the value is outside the representable range.
pub fn format_published(unix_seconds: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp(unix_seconds, 0)
        .map(|moment| moment.format(PUBLISHED_FORMAT).to_string())
}

/// Parses a published timestamp into unix seconds.
///
/// Accepts RFC 2822, RFC 3339 and plain `YYYY-MM-DD` (midnight UTC).
pub fn parse_published(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(moment) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(moment.timestamp());
    }
    if let Ok(moment) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(moment.timestamp());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|moment| moment.and_utc().timestamp())
}
