use crate::domain::{Clock, Timestamp};
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// Controllable clock for tests and simulation.
///
/// Time only advances via explicit `advance`/`set_time` calls, which makes
/// day-rollover behavior (OHLC bucketing) deterministic.
#[derive(Debug)]
pub struct SimulationClock {
    inner: Arc<RwLock<Timestamp>>,
}

impl SimulationClock {
    /// Create a clock frozen at the current time.
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Create a clock frozen at a specific time.
    pub fn at(time: Timestamp) -> Self {
        SimulationClock {
            inner: Arc::new(RwLock::new(time)),
        }
    }

    /// Advance time by a duration.
    pub fn advance(&self, duration: Duration) {
        let mut time = self.inner.write();
        *time += duration;
    }

    /// Set time to a specific value.
    pub fn set_time(&self, time: Timestamp) {
        *self.inner.write() = time;
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SimulationClock {
    fn clone(&self) -> Self {
        SimulationClock {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Clock for SimulationClock {
    fn now(&self) -> Timestamp {
        *self.inner.read()
    }
}
