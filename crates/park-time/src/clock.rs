//! Clock implementations

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use park_core::PresenceTime;

/// Source of presence time
pub trait Clock: Send + Sync {
    /// Current time. MUST be monotonically non-decreasing.
    fn now(&self) -> PresenceTime;
}

/// Monotonic clock backed by the OS
pub struct SystemClock {
    /// Reference instant (time zero)
    reference: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            reference: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> PresenceTime {
        let elapsed = self.reference.elapsed();
        PresenceTime::from_micros(elapsed.as_micros() as i64)
    }
}

/// Manually advanced clock for simulations
///
/// Clones share the same underlying time.
#[derive(Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock::default()
    }

    pub fn starting_at(t: PresenceTime) -> Self {
        ManualClock {
            micros: Arc::new(AtomicI64::new(t.as_micros())),
        }
    }

    /// Advance by `dt`, returning the new time
    pub fn advance(&self, dt: Duration) -> PresenceTime {
        let step = dt.as_micros() as i64;
        let value = self.micros.fetch_add(step, Ordering::SeqCst) + step;
        PresenceTime::from_micros(value)
    }

    pub fn advance_millis(&self, ms: u64) -> PresenceTime {
        self.advance(Duration::from_millis(ms))
    }

    /// Jump to `t`; only moves forward
    pub fn set(&self, t: PresenceTime) {
        self.micros.fetch_max(t.as_micros(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> PresenceTime {
        PresenceTime::from_micros(self.micros.load(Ordering::SeqCst))
    }
}
