//! Port for time abstraction.
//!
//! Sliding-window session refresh, cache TTL checks, and revocation
//! staleness all compare against "now"; tests pin it.

use chrono::{DateTime, Utc};

/// Contract for time access.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used everywhere outside tests.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
