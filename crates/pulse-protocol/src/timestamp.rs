//! ISO-8601 timestamps with millisecond precision (`2026-10-16T09:30:00.123Z`).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serializer;

/// Format a UTC timestamp as RFC 3339 with milliseconds and a `Z` suffix.
pub fn format_millis(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// `serialize_with` helper for report timestamps.
pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_millis(ts))
}
