use std::time::Duration;
use std::time::Instant;

/// Monotonic `seconds.nanoseconds` stamp relative to `epoch`.
pub(crate) fn stamp_since(epoch: Instant) -> String {
    format_stamp(epoch.elapsed())
}

pub(crate) fn format_stamp(elapsed: Duration) -> String {
    format!("{}.{:09}", elapsed.as_secs(), elapsed.subsec_nanos())
}
