//! Timestamp parsing and formatting for event rows
//!
//! Writers in the wild emit several ISO-8601 shapes: RFC 3339 with `T` and
//! offset, the space-separated form, naive datetimes, and bare dates. The
//! parser accepts all of them; naive text is taken as UTC. Formatting always
//! emits canonical RFC 3339 with an explicit offset, so formatted output
//! parses back to the same instant.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::error::{Error, Result};

/// Datetime formats tried after RFC 3339, most specific first.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse ISO-8601 timestamp text into a UTC instant.
///
/// Accepted shapes, tried in order:
/// 1. RFC 3339 (`2023-01-05T12:30:00Z`, `2023-01-05T12:30:00.250+02:00`)
/// 2. Space-separated with offset (`2023-01-05 12:30:00+00:00`)
/// 3. Naive datetime, assumed UTC (`2023-01-05T12:30:00`, `2023-01-05 12:30:00.5`)
/// 4. Bare date, midnight UTC (`2023-01-05`)
///
/// # Errors
///
/// Returns `Error::InvalidTimestamp` when no accepted form parses.
///
/// # Example
///
/// ```
/// use runlog::time::parse_timestamp;
///
/// let ts = parse_timestamp("2023-01-05 12:30:00+00:00").unwrap();
/// assert_eq!(ts.to_rfc3339(), "2023-01-05T12:30:00+00:00");
/// ```
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    let trimmed = text.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }

    Err(Error::InvalidTimestamp(text.to_string()))
}

/// Format a UTC instant as canonical row text.
///
/// RFC 3339 with a numeric offset and subseconds only when non-zero, e.g.
/// `2023-01-05T12:30:00+00:00` or `2023-01-05T12:30:00.250+00:00`.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}
