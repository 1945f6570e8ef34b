use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const READY_MESSAGE: &str = "Service is ready to accept requests";
pub const NOT_READY_MESSAGE: &str = "Service is not ready yet";

/// Overall service status in a health report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ServiceStatus {
    Up,
    Degraded,
}

/// Database status in a health report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DatabaseStatus {
    Up,
    Down,
    Unknown,
}

/// Database section of a [`HealthReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub status: DatabaseStatus,
    /// Ping round-trip in milliseconds (0 unless the ping succeeded).
    pub response_time_ms: u64,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: ServiceStatus,
    #[serde(serialize_with = "crate::timestamp::serialize")]
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: f64,
    pub database: DatabaseHealth,
    /// Time spent building this report, in milliseconds.
    pub response_time_ms: u64,
}

impl HealthReport {
    /// A fresh report: service UP, database not yet probed.
    pub fn new(timestamp: DateTime<Utc>, uptime: Duration) -> Self {
        Self {
            status: ServiceStatus::Up,
            timestamp,
            uptime_seconds: uptime.as_secs_f64(),
            database: DatabaseHealth {
                status: DatabaseStatus::Unknown,
                response_time_ms: 0,
            },
            response_time_ms: 0,
        }
    }

    pub fn database_up(&mut self, ping_time: Duration) {
        self.database.status = DatabaseStatus::Up;
        self.database.response_time_ms = whole_millis(ping_time);
    }

    /// Mark the database DOWN, which degrades the whole report.
    pub fn database_down(&mut self) {
        self.database.status = DatabaseStatus::Down;
        self.status = ServiceStatus::Degraded;
    }

    pub fn finish(&mut self, elapsed: Duration) {
        self.response_time_ms = whole_millis(elapsed);
    }

    pub fn is_up(&self) -> bool {
        self.status == ServiceStatus::Up
    }
}

/// Body of `GET /health/ready`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessReport {
    pub ready: bool,
    pub message: String,
}

impl ReadinessReport {
    pub fn new(ready: bool) -> Self {
        let message = if ready { READY_MESSAGE } else { NOT_READY_MESSAGE };
        Self {
            ready,
            message: message.to_string(),
        }
    }
}

/// Body of `GET /health/live`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessReport {
    pub alive: bool,
    #[serde(serialize_with = "crate::timestamp::serialize")]
    pub timestamp: DateTime<Utc>,
}

impl LivenessReport {
    pub fn alive(timestamp: DateTime<Utc>) -> Self {
        Self {
            alive: true,
            timestamp,
        }
    }
}

// Truncates, so a reported time never exceeds the measured one.
fn whole_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
