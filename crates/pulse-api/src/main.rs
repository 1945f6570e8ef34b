//! Pulse API — health, readiness and liveness probe server.
//!
//! Usage: `pulse-api [config.toml]`. Without a config file, settings come
//! from `PULSE_*` environment variables and `DATABASE_URL`.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use pulse_api::clock::SystemClock;
use pulse_api::config::ApiConfig;
use pulse_api::db::{self, DatabaseHealthChecker, OfflineDatabase, PgHealthChecker};
use pulse_api::routes::build_router;
use pulse_api::shutdown;
use pulse_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Uptime counts from here.
    let clock = Arc::new(SystemClock::new());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "pulse-api starting");

    let config_path = std::env::args().nth(1);
    let config = ApiConfig::load(config_path.as_deref())?;

    // ── Database ────────────────────────────────────────────────
    let postgres = match config.database_url.as_deref() {
        Some(url) => {
            tracing::info!(
                max_connections = config.max_connections,
                "connecting to PostgreSQL"
            );
            Some(Arc::new(PgHealthChecker::connect_lazy(
                url,
                config.max_connections,
                config.ping_timeout(),
            )?))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, running without a database; /health will report DEGRADED");
            None
        }
    };

    let checker: Arc<dyn DatabaseHealthChecker> = match &postgres {
        Some(pg) => pg.clone(),
        None => Arc::new(OfflineDatabase),
    };

    let monitor = postgres.as_ref().map(|pg| {
        tokio::spawn(db::monitor::run(
            pg.state_cell(),
            pg.clone(),
            config.monitor_interval(),
            config.ping_timeout(),
        ))
    });

    // ── HTTP ────────────────────────────────────────────────────
    let state = AppState::with_config(checker, clock, &config);
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::drain(
            shutdown::signal(),
            postgres.as_ref().map(|pg| pg.state_cell()),
        ))
        .await?;

    // ── Teardown ────────────────────────────────────────────────
    if let Some(handle) = monitor {
        handle.abort();
    }
    if let Some(pg) = postgres {
        pg.close().await;
    }

    tracing::info!("pulse-api stopped");
    Ok(())
}
