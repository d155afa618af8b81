//! Millisecond tick counter for timers and keepalives.

use std::time::{SystemTime, UNIX_EPOCH};

use nix::time::{clock_gettime, ClockId};

/// Ticks per second returned by [`get_ticks`].
pub const TICKS_PER_SEC: u64 = 1000;

/// Current tick count.
///
/// Uses `CLOCK_MONOTONIC` so changes to the system clock don't disturb
/// timers. Falls back to wall-clock time if the monotonic clock is missing.
pub fn get_ticks() -> u64 {
    if let Ok(ts) = clock_gettime(ClockId::CLOCK_MONOTONIC) {
        let secs = u64::try_from(ts.tv_sec()).unwrap_or(0);
        let nanos = u64::try_from(ts.tv_nsec()).unwrap_or(0);
        return secs * TICKS_PER_SEC + nanos / (1_000_000_000 / TICKS_PER_SEC);
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    now.as_secs() * TICKS_PER_SEC + u64::from(now.subsec_micros()) / (1_000_000 / TICKS_PER_SEC)
}
