//! Identity and time primitives for REWIND records

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Milliseconds since the Unix epoch, the unit timeline ordering works in.
pub type EpochMillis = i64;

/// Parse an ISO-8601 timestamp string into a UTC timestamp.
///
/// Accepts, in order:
/// - RFC 3339 (`2024-05-01T10:00:00Z`, `2024-05-01T12:00:00+02:00`)
/// - date-times without an offset, read as UTC (`2024-05-01T10:00:00.250`)
/// - bare dates, read as UTC midnight (`2024-05-01`)
///
/// Returns `None` for anything else. Callers decide how an unparsable value
/// orders; parsing never fails loudly.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Parse a timestamp string straight to epoch milliseconds.
pub fn parse_timestamp_millis(raw: &str) -> Option<EpochMillis> {
    parse_timestamp(raw).map(|ts| ts.timestamp_millis())
}

/// Pick the first present, non-blank timestamp field.
///
/// Records that carry both `timestamp` and `created_at` resolve through this
/// helper with `timestamp` passed first, so every record type follows the same
/// precedence.
pub fn first_timestamp<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .find(|value| !value.trim().is_empty())
}
