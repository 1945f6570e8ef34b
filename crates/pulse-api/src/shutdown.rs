//! Graceful shutdown on SIGTERM and SIGINT.

use std::future::Future;

use pulse_protocol::ConnectionState;

use crate::db::ConnectionCell;

/// Wait for `trigger`, then mark the database `Disconnecting`.
///
/// Runs as the `with_graceful_shutdown` future, so the state flips before
/// in-flight requests drain: `/health/ready` answers 503 while the server
/// winds down and the monitor leaves the cell alone.
pub async fn drain(trigger: impl Future<Output = ()>, database: Option<ConnectionCell>) {
    trigger.await;
    if let Some(cell) = database {
        let previous = cell.set(ConnectionState::Disconnecting);
        tracing::info!(from = %previous, "draining, database marked disconnecting");
    }
}

/// Resolves when the process receives Ctrl+C or SIGTERM.
///
/// Passed to `axum::serve(..).with_graceful_shutdown`, which then stops
/// accepting connections and drains in-flight requests.
pub async fn signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received Ctrl+C, shutting down");
        }
        _ = terminate => {
            tracing::info!("received SIGTERM, shutting down");
        }
    }
}
