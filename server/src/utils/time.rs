//! Time utility functions

use chrono::{DateTime, NaiveDateTime};

/// Parse a request timestamp.
///
/// Accepts the `YYYY-MM-DD HH:MM:SS` form the UI sends (optionally with
/// fractional seconds) and RFC 3339. RFC 3339 input is converted to UTC.
pub fn parse_query_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()))
}
