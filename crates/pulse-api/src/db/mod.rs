//! Database health checking.
//!
//! Handlers only see the database through [`DatabaseHealthChecker`]: a
//! cheap connection-state read and an async ping. Implementations:
//! - [`PgHealthChecker`]: PostgreSQL via a lazily-connecting `PgPool` (production).
//! - [`OfflineDatabase`]: no database configured; always disconnected.
//! - [`MockDatabase`]: scriptable state and ping outcome (tests).

pub mod mock;
pub mod monitor;
pub mod offline;
pub mod postgres;

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use pulse_protocol::ConnectionState;

pub use mock::MockDatabase;
pub use offline::OfflineDatabase;
pub use postgres::PgHealthChecker;

/// Errors returned by a database ping.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DbError {
    #[error("database unreachable: {0}")]
    Unreachable(String),

    #[error("database ping timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("database connection closed")]
    Closed,
}

impl From<sqlx::Error> for DbError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolClosed => DbError::Closed,
            other => DbError::Unreachable(other.to_string()),
        }
    }
}

/// Convenience alias for ping results.
pub type DbResult<T> = Result<T, DbError>;

/// Capability the probe handlers use to inspect the database.
#[async_trait]
pub trait DatabaseHealthChecker: Send + Sync {
    /// Current connection state. Must not touch the network.
    fn status(&self) -> ConnectionState;

    /// Round-trip a trivial request to the database.
    async fn ping(&self) -> DbResult<()>;
}

/// Ping, giving up after `timeout`.
pub async fn ping_with_timeout(
    checker: &dyn DatabaseHealthChecker,
    timeout: Duration,
) -> DbResult<()> {
    match tokio::time::timeout(timeout, checker.ping()).await {
        Ok(result) => result,
        Err(_) => Err(DbError::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}

/// Shared, cloneable connection-state slot.
///
/// Written by the connection monitor and the shutdown path, read by every
/// `status()` call.
#[derive(Debug, Clone)]
pub struct ConnectionCell(Arc<RwLock<ConnectionState>>);

impl ConnectionCell {
    pub fn new(state: ConnectionState) -> Self {
        Self(Arc::new(RwLock::new(state)))
    }

    pub fn get(&self) -> ConnectionState {
        *self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `state`, returning the previous value.
    pub fn set(&self, state: ConnectionState) -> ConnectionState {
        let mut slot = self.0.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, state)
    }

    /// Store `state` unless the cell currently holds `blocked`.
    /// Returns the previous value when the write happened.
    pub fn set_unless(
        &self,
        blocked: ConnectionState,
        state: ConnectionState,
    ) -> Option<ConnectionState> {
        let mut slot = self.0.write().unwrap_or_else(PoisonError::into_inner);
        if *slot == blocked {
            return None;
        }
        Some(std::mem::replace(&mut *slot, state))
    }
}
