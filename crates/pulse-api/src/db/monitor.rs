//! Background connection monitor.
//!
//! Keeps a [`ConnectionCell`] in step with reality by pinging the database
//! on a fixed interval. The probe handlers read the cell instead of
//! discovering connection loss on their own.

use std::sync::Arc;
use std::time::Duration;

use pulse_protocol::ConnectionState;
use tokio::time::{self, MissedTickBehavior};

use super::{ConnectionCell, DatabaseHealthChecker, ping_with_timeout};

/// Run the monitor loop, checking every `interval`.
///
/// The first check runs immediately. Runs until the task is aborted;
/// intended to be spawned as a background tokio task.
pub async fn run(
    cell: ConnectionCell,
    checker: Arc<dyn DatabaseHealthChecker>,
    interval: Duration,
    ping_timeout: Duration,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        check_once(&cell, checker.as_ref(), ping_timeout).await;
    }
}

/// Ping once and record the outcome in `cell`. Returns the resulting state.
///
/// A cell in `Disconnecting` is owned by the shutdown path and left alone.
pub async fn check_once(
    cell: &ConnectionCell,
    checker: &dyn DatabaseHealthChecker,
    ping_timeout: Duration,
) -> ConnectionState {
    let before = cell.get();
    if before == ConnectionState::Disconnecting {
        return before;
    }
    if before == ConnectionState::Disconnected {
        cell.set_unless(ConnectionState::Disconnecting, ConnectionState::Connecting);
    }

    let (next, error) = match ping_with_timeout(checker, ping_timeout).await {
        Ok(()) => (ConnectionState::Connected, None),
        Err(e) => (ConnectionState::Disconnected, Some(e)),
    };

    if cell
        .set_unless(ConnectionState::Disconnecting, next)
        .is_none()
    {
        return ConnectionState::Disconnecting;
    }

    if before != next {
        match &error {
            None => tracing::info!(from = %before, "database connected"),
            Some(e) => tracing::warn!(from = %before, error = %e, "database disconnected"),
        }
    } else if let Some(e) = &error {
        tracing::debug!(error = %e, "database still unreachable");
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockDatabase;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn connecting_becomes_connected() {
        let db = MockDatabase::new(ConnectionState::Connecting);
        let cell = db.state_cell();

        let state = check_once(&cell, &db, TIMEOUT).await;
        assert_eq!(state, ConnectionState::Connected);
        assert_eq!(cell.get(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn failed_ping_disconnects() {
        let db = MockDatabase::connected();
        db.fail_pings("connection reset");

        let state = check_once(&db.state_cell(), &db, TIMEOUT).await;
        assert_eq!(state, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn disconnected_reconnects_when_database_returns() {
        let db = MockDatabase::disconnected();
        let state = check_once(&db.state_cell(), &db, TIMEOUT).await;
        assert_eq!(state, ConnectionState::Connected);
        assert_eq!(db.ping_count(), 1);
    }

    #[tokio::test]
    async fn disconnecting_is_left_alone() {
        let db = MockDatabase::new(ConnectionState::Disconnecting);

        let state = check_once(&db.state_cell(), &db, TIMEOUT).await;
        assert_eq!(state, ConnectionState::Disconnecting);
        assert_eq!(db.ping_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_database_counts_as_disconnected() {
        let db = MockDatabase::connected();
        db.set_ping_delay(Duration::from_secs(60));

        let state = check_once(&db.state_cell(), &db, TIMEOUT).await;
        assert_eq!(state, ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_checks_on_every_tick() {
        let db = Arc::new(MockDatabase::new(ConnectionState::Connecting));
        let cell = db.state_cell();
        let handle = tokio::spawn(run(
            cell.clone(),
            db.clone(),
            Duration::from_secs(10),
            TIMEOUT,
        ));

        // First tick fires immediately.
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(cell.get(), ConnectionState::Connected);

        db.fail_pings("gone");
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(cell.get(), ConnectionState::Disconnected);
        assert!(db.ping_count() >= 2);

        handle.abort();
    }
}
