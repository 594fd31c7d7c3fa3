//! Wall-clock helpers for record timestamps.
//!
//! Timestamps are Unix epoch milliseconds.

use std::time::{SystemTime, UNIX_EPOCH};

/// Returns current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
        })
}

/// Returns the `updated_at` value for a mutation of a record last touched at
/// `previous`.
///
/// Two mutations inside the same millisecond (or a clock stepping backwards)
/// still yield a strictly greater value.
pub fn next_timestamp(previous: i64) -> i64 {
    now_epoch_ms().max(previous.saturating_add(1))
}
