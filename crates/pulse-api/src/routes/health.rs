//! Health, readiness and liveness probes.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use pulse_protocol::{ConnectionState, HealthReport, LivenessReport, ReadinessReport};
use tokio::time::Instant;

use crate::db;
use crate::state::AppState;

/// GET /health — process and database health.
///
/// Pings the database only when the connection is established or being
/// established. Any ping failure degrades the report to 503; the handler
/// itself never errors.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let started = Instant::now();
    let mut report = HealthReport::new(state.clock.now(), state.clock.uptime());

    let connection = state.db.status();
    if connection.is_pingable() {
        let ping_started = Instant::now();
        match db::ping_with_timeout(state.db.as_ref(), state.ping_timeout).await {
            Ok(()) => report.database_up(ping_started.elapsed()),
            Err(e) => {
                tracing::warn!(error = %e, connection = %connection, "database ping failed");
                report.database_down();
            }
        }
    } else {
        tracing::warn!(connection = %connection, "database not connected, skipping ping");
        report.database_down();
    }

    report.finish(started.elapsed());

    let status = if report.is_up() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

/// GET /health/ready — connected and past the startup grace period.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessReport>) {
    let connection = state.db.status();
    let uptime = state.clock.uptime();
    let ready = connection == ConnectionState::Connected && uptime > state.startup_grace;

    if ready {
        (StatusCode::OK, Json(ReadinessReport::new(true)))
    } else {
        tracing::debug!(
            connection = %connection,
            uptime_secs = uptime.as_secs_f64(),
            "not ready"
        );
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessReport::new(false)),
        )
    }
}

/// GET /health/live — always 200 while the process can answer.
pub async fn live(State(state): State<AppState>) -> (StatusCode, Json<LivenessReport>) {
    (StatusCode::OK, Json(LivenessReport::alive(state.clock.now())))
}
