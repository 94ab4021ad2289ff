//! Server configuration.
//!
//! Loaded once at startup from a JSON file:
//!
//! ```json
//! { "max_conn": 10, "port": "8080", "host": "127.0.0.1" }
//! ```
//!
//! Optional keys: `notify_on_leave`, `username_policy` (`"prefix"` or
//! `"exact"`), `write_timeout_ms`, `outbound_queue_capacity`.

use std::{fs, path::Path, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::UsernamePolicy;

const DEFAULT_WRITE_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_OUTBOUND_QUEUE_CAPACITY: usize = 64;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Maximum number of concurrent sessions
    pub max_conn: u8,
    pub port: String,
    pub host: String,
    /// Broadcast a Notification when an authenticated user disconnects
    #[serde(default)]
    pub notify_on_leave: bool,
    #[serde(default)]
    pub username_policy: UsernamePolicy,
    /// Timeout for writing one frame to a client
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
    /// Capacity of each connection's outbound queue
    #[serde(default = "default_outbound_queue_capacity")]
    pub outbound_queue_capacity: usize,
}

fn default_write_timeout_ms() -> u64 {
    DEFAULT_WRITE_TIMEOUT_MS
}

fn default_outbound_queue_capacity() -> usize {
    DEFAULT_OUTBOUND_QUEUE_CAPACITY
}

impl ServerConfig {
    /// Read and validate the config file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_conn == 0 {
            return Err(ConfigError::Invalid("max_conn must be at least 1".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        self.port_number()?;
        if self.outbound_queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "outbound_queue_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn port_number(&self) -> Result<u16, ConfigError> {
        self.port
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("port '{}' is not a valid port", self.port)))
    }

    /// `host:port` string for binding the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}
