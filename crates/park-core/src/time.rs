//! Time primitive for the park
//!
//! Presence time is a monotonic local timestamp used to stamp motion samples
//! and drive animation frames. It never travels over the wire.

use std::ops::{Add, Sub};
use std::time::Duration;

/// Local presence time, microseconds since the clock's epoch
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PresenceTime(pub i64);

impl PresenceTime {
    pub const ZERO: PresenceTime = PresenceTime(0);

    #[inline]
    pub fn from_micros(micros: i64) -> Self {
        PresenceTime(micros)
    }

    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        PresenceTime(millis * 1000)
    }

    #[inline]
    pub fn as_micros(self) -> i64 {
        self.0
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0 / 1000
    }

    /// Milliseconds elapsed since `earlier`, zero if `earlier` is later
    #[inline]
    pub fn millis_since(self, earlier: PresenceTime) -> f64 {
        (self.0 - earlier.0).max(0) as f64 / 1000.0
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        PresenceTime(self.0.saturating_add(duration.as_micros() as i64))
    }
}

impl Add<Duration> for PresenceTime {
    type Output = PresenceTime;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        PresenceTime(self.0 + rhs.as_micros() as i64)
    }
}

impl Sub<PresenceTime> for PresenceTime {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: PresenceTime) -> Self::Output {
        let diff = self.0 - rhs.0;
        if diff >= 0 {
            Duration::from_micros(diff as u64)
        } else {
            Duration::ZERO
        }
    }
}

impl std::fmt::Debug for PresenceTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t({:.3}ms)", self.0 as f64 / 1000.0)
    }
}
