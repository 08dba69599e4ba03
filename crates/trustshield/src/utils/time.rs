use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};

pub fn rfc3339(at: SystemTime) -> String {
    let datetime: DateTime<Utc> = at.into();
    datetime.to_rfc3339()
}

pub fn now_rfc3339() -> String {
    rfc3339(SystemTime::now())
}

/// Timestamp `minutes` before now, for entries synthesised relative to the
/// current time.
pub fn minutes_ago_rfc3339(minutes: u64) -> String {
    let at = SystemTime::now()
        .checked_sub(Duration::from_secs(minutes * 60))
        .unwrap_or(std::time::UNIX_EPOCH);
    rfc3339(at)
}
