//! Pulse API server configuration, loadable from TOML or environment.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

/// Top-level API server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// PostgreSQL connection URL. None runs without a database (always degraded).
    #[serde(default)]
    pub database_url: Option<String>,
    /// Upper bound on a single database ping.
    #[serde(default = "default_ping_timeout_ms")]
    pub ping_timeout_ms: u64,
    /// Uptime the service must exceed before reporting ready.
    #[serde(default = "default_startup_grace_secs")]
    pub startup_grace_secs: u64,
    /// How often the background monitor re-checks the connection.
    #[serde(default = "default_monitor_interval_secs")]
    pub monitor_interval_secs: u64,
    /// Pool size. Health checks need very few connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_ping_timeout_ms() -> u64 {
    2000
}

fn default_startup_grace_secs() -> u64 {
    5
}

fn default_monitor_interval_secs() -> u64 {
    10
}

fn default_max_connections() -> u32 {
    5
}

impl ApiConfig {
    /// Load from the TOML file at `path` if given, otherwise from the environment.
    /// `DATABASE_URL` in the environment wins over the file either way.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_env()?,
        };
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = Some(url);
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would stall or crash the probes at runtime.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.monitor_interval_secs == 0 {
            anyhow::bail!("monitor_interval_secs must be greater than zero");
        }
        if self.ping_timeout_ms == 0 {
            anyhow::bail!("ping_timeout_ms must be greater than zero");
        }
        if self.max_connections == 0 {
            anyhow::bail!("max_connections must be greater than zero");
        }
        Ok(())
    }

    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
        let config: Self =
            toml::from_str(&contents).with_context(|| format!("parsing config {path}"))?;
        config
            .validate()
            .with_context(|| format!("invalid config {path}"))?;
        Ok(config)
    }

    /// Load config from `PULSE_*` environment variables and `DATABASE_URL`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        let config = Self {
            host: lookup("PULSE_HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PULSE_PORT")?.unwrap_or(defaults.port),
            database_url: lookup("DATABASE_URL"),
            ping_timeout_ms: parse_var(&lookup, "PULSE_PING_TIMEOUT_MS")?
                .unwrap_or(defaults.ping_timeout_ms),
            startup_grace_secs: parse_var(&lookup, "PULSE_STARTUP_GRACE_SECS")?
                .unwrap_or(defaults.startup_grace_secs),
            monitor_interval_secs: parse_var(&lookup, "PULSE_MONITOR_INTERVAL_SECS")?
                .unwrap_or(defaults.monitor_interval_secs),
            max_connections: parse_var(&lookup, "PULSE_MAX_CONNECTIONS")?
                .unwrap_or(defaults.max_connections),
        };
        config.validate().context("invalid environment config")?;
        Ok(config)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn ping_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_timeout_ms)
    }

    pub fn startup_grace(&self) -> Duration {
        Duration::from_secs(self.startup_grace_secs)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: None,
            ping_timeout_ms: default_ping_timeout_ms(),
            startup_grace_secs: default_startup_grace_secs(),
            monitor_interval_secs: default_monitor_interval_secs(),
            max_connections: default_max_connections(),
        }
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("invalid {key}: {raw:?}"))
        })
        .transpose()
}
