//! Clock utilities.
//!
//! Wall-clock reads go through the [`WallClock`] trait so that anything
//! derived from the date (season identifiers, generation timestamps) can be
//! pinned in tests.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Source of wall-clock time.
pub trait WallClock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl WallClock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Elapsed-time tracker for a single burst.
#[derive(Debug, Clone)]
pub struct BurstClock {
    epoch: Instant,
    epoch_wall: DateTime<Utc>,
}

impl BurstClock {
    /// Start a clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: Utc::now(),
        }
    }

    /// Time elapsed since the clock started.
    pub fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Wall-clock time at start.
    pub fn epoch_wall(&self) -> DateTime<Utc> {
        self.epoch_wall
    }
}

/// Milliseconds since the Unix epoch, as used for stored file names.
pub fn epoch_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_is_stable() {
        let at = Utc.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap();
        let clock = FixedClock(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_burst_clock_elapsed() {
        let clock = BurstClock::start();
        assert!(clock.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_epoch_millis() {
        let at = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 1).unwrap();
        assert_eq!(epoch_millis(at), 1000);
    }
}
