//! Time-related utilities.
//!
//! The escrow backend timestamps everything in Unix milliseconds (UTC),
//! so all helpers here work in that unit.

use chrono::{DateTime, Utc};

/// Get current Unix timestamp in milliseconds (UTC)
pub fn utc_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert Unix timestamp (milliseconds) to RFC 3339 format (UTC)
pub fn timestamp_to_rfc3339(timestamp_millis: i64) -> Option<String> {
    let dt: DateTime<Utc> = DateTime::from_timestamp_millis(timestamp_millis)?;
    Some(dt.to_rfc3339())
}
