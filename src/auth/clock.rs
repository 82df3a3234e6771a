//! Timestamp source for signed requests.
//!
//! Signed requests carry a `timestamp` parameter in milliseconds since the UNIX
//! epoch. The client subtracts its measured clock-skew offset from the value
//! returned here before stamping a request.

use time::OffsetDateTime;

/// Trait for providing the local wall-clock time.
pub trait Clock: Send + Sync {
    /// Milliseconds since the UNIX epoch.
    fn now_millis(&self) -> i64;
}

/// A clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Create a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
    }
}
