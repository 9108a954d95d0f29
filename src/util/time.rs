//! Wall-clock helpers for uptime tracking and the daily tick

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Days, Local, TimeZone};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Instant::now);
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0)
}

/// Period of the game tick
pub const TICK_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest single timer wait we hand to the runtime (2^31 - 1 ms)
pub const MAX_TIMER_DELAY: Duration = Duration::from_millis(i32::MAX as u64);

/// The first midnight strictly after `now`, in `now`'s timezone.
///
/// Falls back to `now + 24h` on days where local midnight does not exist
/// (DST transitions at 00:00).
pub fn next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Tz> {
    let tz = now.timezone();
    now.date_naive()
        .checked_add_days(Days::new(1))
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .unwrap_or_else(|| now.clone() + chrono::Duration::hours(24))
}

/// How long until the next local midnight
pub fn until_next_local_midnight() -> Duration {
    let now = Local::now();
    (next_midnight(&now) - now).to_std().unwrap_or(Duration::ZERO)
}

/// Break `total` into waits no longer than `max_chunk` that add up to `total`
pub fn split_delay(total: Duration, max_chunk: Duration) -> Vec<Duration> {
    if max_chunk.is_zero() {
        return vec![total];
    }

    let mut chunks = Vec::new();
    let mut remaining = total;
    while remaining > max_chunk {
        chunks.push(max_chunk);
        remaining -= max_chunk;
    }
    chunks.push(remaining);
    chunks
}
