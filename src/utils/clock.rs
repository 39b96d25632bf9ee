use chrono::Utc;

pub const ONE_DAY_IN_MILLIS: i64 = 24 * 60 * 60 * 1000;
pub const ONE_WEEK_IN_MILLIS: i64 = 7 * ONE_DAY_IN_MILLIS;

/// Current wall-clock time as milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
