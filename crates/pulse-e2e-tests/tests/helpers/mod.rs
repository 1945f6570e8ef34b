//! Shared test harness for E2E integration tests.
//!
//! Wires the real router to a `MockDatabase` and a `ManualClock` so each
//! test can script connection state, ping outcome and uptime.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use pulse_api::clock::ManualClock;
use pulse_api::db::MockDatabase;
use pulse_api::routes::build_router;
use pulse_api::state::AppState;
use pulse_protocol::ConnectionState;

/// End-to-end harness: router + scriptable database + manual clock.
pub struct TestHarness {
    pub db: Arc<MockDatabase>,
    pub clock: Arc<ManualClock>,
    pub state: AppState,
}

impl TestHarness {
    /// Freshly started process with the database still connecting.
    pub fn starting() -> Self {
        Self::new(ConnectionState::Connecting, Duration::ZERO)
    }

    /// Process well past startup with an established connection.
    pub fn warmed_up() -> Self {
        Self::new(ConnectionState::Connected, Duration::from_secs(120))
    }

    pub fn new(connection: ConnectionState, uptime: Duration) -> Self {
        let db = Arc::new(MockDatabase::new(connection));
        let clock = Arc::new(ManualClock::with_uptime(uptime));
        let state = AppState::new(db.clone(), clock.clone());
        Self { db, clock, state }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// GET `path` and return the status plus parsed JSON body.
    pub async fn get(&self, path: &str) -> (StatusCode, serde_json::Value) {
        let response = self
            .router()
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&body).unwrap();
        (status, json)
    }

    pub async fn health(&self) -> (StatusCode, serde_json::Value) {
        self.get("/health").await
    }

    pub async fn ready(&self) -> (StatusCode, serde_json::Value) {
        self.get("/health/ready").await
    }

    pub async fn live(&self) -> (StatusCode, serde_json::Value) {
        self.get("/health/live").await
    }
}
