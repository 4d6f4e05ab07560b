use chrono::{Local, SecondsFormat};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, used to tag backup files.
pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Current local time as an ISO-8601 string with offset and microseconds.
pub fn local_timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Trims an ISO-8601 timestamp to `YYYY-MM-DDTHH:MM:SS` for display.
pub fn display_seconds(timestamp: &str) -> &str {
    match timestamp.char_indices().nth(19) {
        Some((idx, _)) => &timestamp[..idx],
        None => timestamp,
    }
}
