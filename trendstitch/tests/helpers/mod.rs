// Re-export helpers so tests can `use helpers::*;`
pub mod mock_fetcher;
pub mod observer;

pub use mock_fetcher::MockFetcher;
pub use observer::RecordingObserver;

use chrono::{DateTime, Duration, Utc};

/// Common search terms used across tests.
pub const TERM: &str = "flu shot";

/// Construct a UTC midnight for readability in tests.
pub fn dt(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    chrono::NaiveDate::from_ymd_opt(y, m, d)
        .expect("invalid date")
        .and_hms_opt(0, 0, 0)
        .expect("invalid time")
        .and_utc()
}

/// `start + n` days.
pub fn plus_days(start: DateTime<Utc>, n: i64) -> DateTime<Utc> {
    start + Duration::days(n)
}
