//! Server configuration from TOML or environment

use anyhow::{ensure, Context, Result};
use lecatalogue::StorageConfig;
use lerecherche::DEFAULT_LIMIT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

/// Default host address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port number
pub const DEFAULT_PORT: u16 = 47270;

/// Accepted `log_level` values
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Origins allowed when none are configured
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://127.0.0.1:3000",
];

/// Server configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Path to the SQLite catalog
    pub db_path: String,

    /// Result limit when a search names none
    pub default_limit: usize,

    /// Enable request logging
    pub enable_logging: bool,

    /// Log level for tracing
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            db_path: StorageConfig::default().db_path,
            default_limit: DEFAULT_LIMIT,
            enable_logging: true,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load config from environment variables with fallback to defaults
    ///
    /// Environment variables:
    /// - `LEBRIQUE_HOST` - Server host
    /// - `LEBRIQUE_PORT` - Server port
    /// - `LEBRIQUE_DB_PATH` - Catalog path
    /// - `LEBRIQUE_LOG_LEVEL` - Log level (trace, debug, info, warn, error)
    /// - `LEBRIQUE_DEFAULT_LIMIT` - Result limit when a search names none
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load config from a TOML file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: ServerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Apply `LEBRIQUE_*` variables on top of this config
    ///
    /// Unparseable numbers are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(host) = std::env::var("LEBRIQUE_HOST") {
            self.host = host;
        }

        if let Ok(port_str) = std::env::var("LEBRIQUE_PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                self.port = port;
            }
        }

        if let Ok(db_path) = std::env::var("LEBRIQUE_DB_PATH") {
            self.db_path = db_path;
        }

        if let Ok(log_level) = std::env::var("LEBRIQUE_LOG_LEVEL") {
            self.log_level = log_level;
        }

        if let Ok(limit_str) = std::env::var("LEBRIQUE_DEFAULT_LIMIT") {
            if let Ok(limit) = limit_str.parse::<usize>() {
                self.default_limit = limit;
            }
        }

        self
    }

    /// Storage settings for the configured catalog
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig {
            db_path: self.db_path.clone(),
            ..StorageConfig::default()
        }
    }

    /// Socket address to bind
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid listen address {}:{}", self.host, self.port))
    }

    /// Base URL clients use to reach the server
    #[must_use]
    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.host.trim().is_empty(), "host is empty");
        ensure!(self.port != 0, "port must be non-zero");
        ensure!(!self.db_path.trim().is_empty(), "db_path is empty");
        ensure!(self.default_limit > 0, "default_limit must be at least 1");
        ensure!(
            LOG_LEVELS.contains(&self.log_level.as_str()),
            "log_level {:?} is not one of {}",
            self.log_level,
            LOG_LEVELS.join(", ")
        );
        Ok(())
    }
}
