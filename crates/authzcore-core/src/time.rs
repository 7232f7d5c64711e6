//! Wall-clock and monotonic time helpers shared across the core.

use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, used for `issued_at`/`expires_at` fields.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the Unix epoch")
        .as_secs()
}

/// Microsecond-resolution latency, derived from a monotonic `Instant` pair.
pub fn micros_between(start: std::time::Instant, end: std::time::Instant) -> u64 {
    end.saturating_duration_since(start).as_micros() as u64
}
