//! Mock database for testing.
//!
//! Scriptable connection state, ping outcome and ping latency, plus a ping
//! counter so tests can assert whether the probe touched the database at all.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use pulse_protocol::ConnectionState;

use super::{ConnectionCell, DatabaseHealthChecker, DbError, DbResult};

pub struct MockDatabase {
    state: ConnectionCell,
    /// `Some(reason)` makes every ping fail as unreachable.
    failure: RwLock<Option<String>>,
    delay: RwLock<Duration>,
    pings: AtomicUsize,
}

impl MockDatabase {
    pub fn new(state: ConnectionState) -> Self {
        Self {
            state: ConnectionCell::new(state),
            failure: RwLock::new(None),
            delay: RwLock::new(Duration::ZERO),
            pings: AtomicUsize::new(0),
        }
    }

    pub fn connected() -> Self {
        Self::new(ConnectionState::Connected)
    }

    pub fn disconnected() -> Self {
        Self::new(ConnectionState::Disconnected)
    }

    pub fn set_state(&self, state: ConnectionState) {
        self.state.set(state);
    }

    /// The underlying state slot, for driving with the connection monitor.
    pub fn state_cell(&self) -> ConnectionCell {
        self.state.clone()
    }

    pub fn fail_pings(&self, reason: impl Into<String>) {
        *self.failure.write().unwrap_or_else(PoisonError::into_inner) = Some(reason.into());
    }

    pub fn succeed_pings(&self) {
        *self.failure.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn set_ping_delay(&self, delay: Duration) {
        *self.delay.write().unwrap_or_else(PoisonError::into_inner) = delay;
    }

    /// Number of pings attempted so far.
    pub fn ping_count(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }
}

impl Default for MockDatabase {
    fn default() -> Self {
        Self::connected()
    }
}

#[async_trait]
impl DatabaseHealthChecker for MockDatabase {
    fn status(&self) -> ConnectionState {
        self.state.get()
    }

    async fn ping(&self) -> DbResult<()> {
        self.pings.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.read().unwrap_or_else(PoisonError::into_inner);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let failure = self
            .failure
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match failure {
            Some(reason) => Err(DbError::Unreachable(reason)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_pings() {
        let db = MockDatabase::connected();
        db.ping().await.unwrap();
        db.ping().await.unwrap();
        assert_eq!(db.ping_count(), 2);
    }

    #[tokio::test]
    async fn scripted_failure_then_recovery() {
        let db = MockDatabase::connected();
        db.fail_pings("no route to host");
        assert!(matches!(db.ping().await, Err(DbError::Unreachable(_))));

        db.succeed_pings();
        assert!(db.ping().await.is_ok());
    }

    #[test]
    fn state_is_settable() {
        let db = MockDatabase::disconnected();
        assert_eq!(db.status(), ConnectionState::Disconnected);
        db.set_state(ConnectionState::Connecting);
        assert_eq!(db.status(), ConnectionState::Connecting);
    }
}
