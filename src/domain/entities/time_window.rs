use chrono::{DateTime, Utc};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Whole days left until `end`, rounded up and floored at zero.
///
/// A window ending 29 days and one second from now reports 30.
pub fn days_remaining(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let remaining = (end - now).num_milliseconds();
    if remaining <= 0 {
        return 0;
    }
    (remaining + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}
