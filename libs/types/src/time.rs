//! Nanosecond timestamp helper.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as nanoseconds since the Unix epoch.
pub fn now_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
