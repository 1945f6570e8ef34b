//! Wall-clock and uptime source for the probe handlers.
//!
//! Handlers never read the system clock directly; they go through a
//! [`Clock`] held in `AppState`, so tests can pin uptime with [`ManualClock`].

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

pub trait Clock: Send + Sync {
    /// Current wall-clock time.
    fn now(&self) -> DateTime<Utc>;

    /// Time since the process started.
    fn uptime(&self) -> Duration;
}

/// Real clock. Uptime counts from construction, so build it first thing in `main`.
#[derive(Debug, Clone)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Test clock with a settable uptime and an optionally pinned wall time.
#[derive(Debug, Default)]
pub struct ManualClock {
    uptime: RwLock<Duration>,
    pinned: RwLock<Option<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn with_uptime(uptime: Duration) -> Self {
        Self {
            uptime: RwLock::new(uptime),
            pinned: RwLock::new(None),
        }
    }

    pub fn set_uptime(&self, uptime: Duration) {
        *self.uptime.write().unwrap_or_else(PoisonError::into_inner) = uptime;
    }

    pub fn advance(&self, by: Duration) {
        *self.uptime.write().unwrap_or_else(PoisonError::into_inner) += by;
    }

    /// Freeze `now()` at `ts`. Until called, `now()` follows the system clock.
    pub fn pin(&self, ts: DateTime<Utc>) {
        *self.pinned.write().unwrap_or_else(PoisonError::into_inner) = Some(ts);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let pinned = *self.pinned.read().unwrap_or_else(PoisonError::into_inner);
        pinned.unwrap_or_else(Utc::now)
    }

    fn uptime(&self) -> Duration {
        *self.uptime.read().unwrap_or_else(PoisonError::into_inner)
    }
}
