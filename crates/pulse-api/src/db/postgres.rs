//! PostgreSQL health checker.

use std::time::Duration;

use async_trait::async_trait;
use pulse_protocol::ConnectionState;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{ConnectionCell, DatabaseHealthChecker, DbError, DbResult};

/// Health checker over a lazily-connecting `PgPool`.
///
/// The pool opens connections on first use, so construction never blocks on
/// the network. The connection state starts as `Connecting` and is kept
/// current by [`super::monitor`].
pub struct PgHealthChecker {
    pool: PgPool,
    state: ConnectionCell,
}

impl PgHealthChecker {
    /// Build a pool for `database_url` without connecting.
    pub fn connect_lazy(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect_lazy(database_url)?;

        Ok(Self::with_pool(pool))
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self {
            pool,
            state: ConnectionCell::new(ConnectionState::Connecting),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Shared handle to the connection state, for the monitor task.
    pub fn state_cell(&self) -> ConnectionCell {
        self.state.clone()
    }

    /// Close the pool, passing through `Disconnecting` to `Disconnected`.
    pub async fn close(&self) {
        self.state.set(ConnectionState::Disconnecting);
        tracing::info!("closing database pool");
        self.pool.close().await;
        self.state.set(ConnectionState::Disconnected);
        tracing::info!("database pool closed");
    }
}

#[async_trait]
impl DatabaseHealthChecker for PgHealthChecker {
    fn status(&self) -> ConnectionState {
        self.state.get()
    }

    async fn ping(&self) -> DbResult<()> {
        if self.pool.is_closed() {
            return Err(DbError::Closed);
        }
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
