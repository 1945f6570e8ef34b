//! Stand-in checker used when no database URL is configured.

use async_trait::async_trait;
use pulse_protocol::ConnectionState;

use super::{DatabaseHealthChecker, DbError, DbResult};

/// Always disconnected; the service reports DEGRADED and never becomes ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineDatabase;

#[async_trait]
impl DatabaseHealthChecker for OfflineDatabase {
    fn status(&self) -> ConnectionState {
        ConnectionState::Disconnected
    }

    async fn ping(&self) -> DbResult<()> {
        Err(DbError::Closed)
    }
}
