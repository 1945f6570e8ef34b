//! Shared application state for the Axum server.

use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::config::ApiConfig;
use crate::db::{DatabaseHealthChecker, OfflineDatabase};

/// Shared application state, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Database capability probed by `/health` and `/health/ready`.
    pub db: Arc<dyn DatabaseHealthChecker>,
    /// Wall-clock and uptime source.
    pub clock: Arc<dyn Clock>,
    /// Upper bound on the `/health` database ping.
    pub ping_timeout: Duration,
    /// Uptime that must be exceeded before `/health/ready` reports ready.
    pub startup_grace: Duration,
}

impl AppState {
    /// State with default timeouts.
    pub fn new(db: Arc<dyn DatabaseHealthChecker>, clock: Arc<dyn Clock>) -> Self {
        Self::with_config(db, clock, &ApiConfig::default())
    }

    pub fn with_config(
        db: Arc<dyn DatabaseHealthChecker>,
        clock: Arc<dyn Clock>,
        config: &ApiConfig,
    ) -> Self {
        Self {
            db,
            clock,
            ping_timeout: config.ping_timeout(),
            startup_grace: config.startup_grace(),
        }
    }

    /// State with no database and the system clock.
    pub fn offline() -> Self {
        Self::new(Arc::new(OfflineDatabase), Arc::new(SystemClock::new()))
    }

    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    pub fn with_startup_grace(mut self, grace: Duration) -> Self {
        self.startup_grace = grace;
        self
    }
}
