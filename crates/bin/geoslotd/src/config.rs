//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `geoslot.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use geoslot_domain::geo::GeoPoint;
use geoslot_domain::permission::PermissionKind;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Scheduling loop settings.
    pub scheduler: SchedulerConfig,
    /// Simulated device settings.
    pub virtual_device: VirtualDeviceConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between two ticks of the poll loop.
    pub poll_interval_secs: u64,
    /// Upper bound on one action list execution, in seconds.
    pub action_timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct VirtualDeviceConfig {
    /// Replay `route` as the position source of the poll loop. When off,
    /// positions only come in through the HTTP API.
    pub enabled: bool,
    /// Permissions the simulated user has granted.
    pub granted_permissions: Vec<PermissionKind>,
    /// Waypoints replayed one per poll, wrapping around.
    pub route: Vec<GeoPoint>,
}

impl Config {
    /// Load configuration from `geoslot.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("geoslot.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("GEOSLOT_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("GEOSLOT_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("GEOSLOT_BIND") {
            if let Some((host, port)) = val.rsplit_once(':') {
                self.server.host = host.to_string();
                if let Ok(port) = port.parse() {
                    self.server.port = port;
                }
            }
        }
        if let Ok(val) = std::env::var("GEOSLOT_DATABASE_URL") {
            self.database.url = val;
        }
        if let Ok(val) = std::env::var("GEOSLOT_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("GEOSLOT_POLL_INTERVAL_SECS") {
            if let Ok(secs) = val.parse() {
                self.scheduler.poll_interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("GEOSLOT_ACTION_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.scheduler.action_timeout_secs = secs;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.scheduler.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll interval must be non-zero".to_string(),
            ));
        }
        if self.scheduler.action_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "action timeout must be non-zero".to_string(),
            ));
        }
        if let Some(bad) = self.virtual_device.route.iter().find(|p| !p.is_valid()) {
            return Err(ConfigError::Validation(format!(
                "route waypoint {bad} is not a valid coordinate"
            )));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.poll_interval_secs)
    }

    #[must_use]
    pub fn action_timeout(&self) -> Duration {
        Duration::from_secs(self.scheduler.action_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:geoslot.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "geoslotd=info,geoslot=info,tower_http=debug".to_string(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            action_timeout_secs: 10,
        }
    }
}

impl Default for VirtualDeviceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            granted_permissions: vec![
                PermissionKind::WriteSettings,
                PermissionKind::DndAccess,
                PermissionKind::SendSms,
            ],
            route: Vec::new(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
