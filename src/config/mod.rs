//! Configuration management for mongate
//!
//! This module handles loading and merging configuration from:
//! - Environment variables
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Connection configuration
    pub connection: ConnectionConfig,

    /// HTTP server configuration
    pub http: HttpConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Connection-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// MongoDB connection URI
    #[serde(default = "default_uri")]
    pub uri: String,

    /// Database all queries run against
    #[serde(default = "default_database")]
    pub database: String,

    /// Connection and ping timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Per-query time budget in seconds, 0 disables it
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Address to bind to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the search UI build
    #[serde(default = "default_search_assets")]
    pub search_assets: PathBuf,

    /// Directory holding the query UI build
    #[serde(default = "default_query_assets")]
    pub query_assets: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "test".to_string()
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_query_timeout() -> u64 {
    30
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_search_assets() -> PathBuf {
    PathBuf::from("client/dist")
}

fn default_query_assets() -> PathBuf {
    PathBuf::from("query-client/dist")
}

fn default_log_level() -> LogLevel {
    LogLevel::Info
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            database: default_database(),
            connect_timeout_secs: default_connect_timeout(),
            query_timeout_secs: default_query_timeout(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            search_assets: default_search_assets(),
            query_assets: default_query_assets(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl ServiceConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Recognized variables: `MONGODB_URI`, `MONGODB_DATABASE`,
    /// `MONGATE_BIND`, `MONGATE_PORT`, `MONGATE_SEARCH_ASSETS`,
    /// `MONGATE_QUERY_ASSETS`, `MONGATE_QUERY_TIMEOUT`, `MONGATE_LOG`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(uri) = std::env::var("MONGODB_URI") {
            config.connection.uri = uri;
        }
        if let Ok(database) = std::env::var("MONGODB_DATABASE") {
            config.connection.database = database;
        }
        if let Ok(bind) = std::env::var("MONGATE_BIND") {
            config.http.bind = bind;
        }
        if let Ok(port) = std::env::var("MONGATE_PORT") {
            config.http.port = parse_port(&port)?;
        }
        if let Ok(dir) = std::env::var("MONGATE_SEARCH_ASSETS") {
            config.http.search_assets = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("MONGATE_QUERY_ASSETS") {
            config.http.query_assets = PathBuf::from(dir);
        }
        if let Ok(timeout) = std::env::var("MONGATE_QUERY_TIMEOUT") {
            config.connection.query_timeout_secs = parse_seconds("MONGATE_QUERY_TIMEOUT", &timeout)?;
        }
        if let Ok(level) = std::env::var("MONGATE_LOG") {
            config.logging.level = level.parse()?;
        }

        Ok(config)
    }

    /// Get the address the HTTP server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http.bind, self.http.port)
    }
}

impl ConnectionConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Get the per-query budget, `None` when disabled
    pub fn query_timeout(&self) -> Option<Duration> {
        if self.query_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.query_timeout_secs))
        }
    }
}

fn parse_port(value: &str) -> Result<u16> {
    value.parse().map_err(|_| {
        ConfigError::InvalidValue {
            field: "MONGATE_PORT".to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

fn parse_seconds(field: &str, value: &str) -> Result<u64> {
    value.parse().map_err(|_| {
        ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
        .into()
    })
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = crate::error::GateError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ConfigError::InvalidValue {
                field: "MONGATE_LOG".to_string(),
                value: s.to_string(),
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServiceConfig::default();
        assert_eq!(config.connection.uri, "mongodb://localhost:27017");
        assert_eq!(config.connection.database, "test");
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.search_assets, PathBuf::from("client/dist"));
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_bind_addr() {
        let config = ServiceConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_query_timeout_zero_disables() {
        let mut config = ConnectionConfig::default();
        assert_eq!(config.query_timeout(), Some(Duration::from_secs(30)));

        config.query_timeout_secs = 0;
        assert_eq!(config.query_timeout(), None);
    }

    #[test]
    fn test_parse_port_rejects_garbage() {
        assert!(parse_port("8080").is_ok());
        assert!(parse_port("eighty").is_err());
        assert!(parse_port("70000").is_err());
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
