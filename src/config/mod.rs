//! Configuration loading for the report scheduler.
//!
//! Loads an optional `config.yaml` from a working directory and overlays
//! environment variables, where a dot in a key becomes an underscore
//! (`database.path` → `DATABASE_PATH`). A missing file is tolerated when
//! the defaults and environment suffice.

use std::{env, net::SocketAddr, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the configuration file looked up in the base directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            server: ServerConfig::default(),
            log: LogConfig::default(),
            queue: QueueConfig::default(),
            worker: WorkerConfig::default(),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Store backend; only "sqlite" is supported
    #[serde(rename = "type", default = "default_database_type")]
    pub kind: String,
    /// Path of the SQLite database file
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            kind: default_database_type(),
            path: default_database_path(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Task queue settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Bound of the in-memory task queue, fixed at construction
    #[serde(default = "default_queue_capacity")]
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_queue_capacity(),
        }
    }
}

/// Worker pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of worker loops draining the queue
    #[serde(default = "default_worker_concurrency")]
    pub concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_worker_concurrency(),
        }
    }
}

impl AppConfig {
    /// Returns the configured bind address as a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.server.bind_addr.parse()
    }
}

fn default_database_type() -> String {
    "sqlite".to_string()
}

fn default_database_path() -> String {
    "report-scheduler.db".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_queue_capacity() -> usize {
    100
}

fn default_worker_concurrency() -> usize {
    1
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },
    #[error("invalid server bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        source: std::net::AddrParseError,
    },
}

/// Loads configuration from `config.yaml` plus environment overrides.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new loader rooted at the current working directory.
    pub fn new() -> Self {
        Self {
            base_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// Creates a loader rooted at the provided directory (useful for tests).
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Loads the configuration file (if present) and applies environment
    /// variable overrides.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let path = self.base_dir.join(CONFIG_FILE_NAME);

        let mut config = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
            Err(source) => return Err(ConfigError::Read { path, source }),
        };

        self.apply_env_overrides(&mut config)?;

        match config.bind_addr() {
            Ok(_) => Ok(config),
            Err(source) => Err(ConfigError::InvalidBindAddr {
                value: config.server.bind_addr.clone(),
                source,
            }),
        }
    }

    fn apply_env_overrides(&self, config: &mut AppConfig) -> Result<(), ConfigError> {
        if let Some(value) = read_env("DATABASE_TYPE") {
            config.database.kind = value;
        }
        if let Some(value) = read_env("DATABASE_PATH") {
            config.database.path = value;
        }
        if let Some(value) = read_env("SERVER_BIND_ADDR") {
            config.server.bind_addr = value;
        }
        if let Some(value) = read_env("LOG_LEVEL") {
            config.log.level = value;
        }
        if let Some(value) = read_env("QUEUE_CAPACITY") {
            config.queue.capacity = parse_env("queue.capacity", &value)?;
        }
        if let Some(value) = read_env("WORKER_CONCURRENCY") {
            config.worker.concurrency = parse_env("worker.concurrency", &value)?;
        }
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}

fn parse_env(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigLoader::with_base_dir(dir.path().to_path_buf())
            .load()
            .unwrap();

        assert_eq!(config.database.kind, "sqlite");
        assert_eq!(config.queue.capacity, 100);
        assert_eq!(config.worker.concurrency, 1);
        assert!(config.bind_addr().is_ok());
    }

    #[test]
    fn yaml_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "database:\n  type: sqlite\n  path: /tmp/reports.db\nqueue:\n  capacity: 7\n",
        )
        .unwrap();

        let config = ConfigLoader::with_base_dir(dir.path().to_path_buf())
            .load()
            .unwrap();

        assert_eq!(config.database.path, "/tmp/reports.db");
        assert_eq!(config.queue.capacity, 7);
        // untouched sections keep their defaults
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "database: [oops").unwrap();

        let result = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load();
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn invalid_bind_addr_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "server:\n  bind_addr: not-an-addr\n",
        )
        .unwrap();

        let result = ConfigLoader::with_base_dir(dir.path().to_path_buf()).load();
        assert!(matches!(result, Err(ConfigError::InvalidBindAddr { .. })));
    }
}
