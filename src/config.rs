//! Server configuration.
//!
//! Every field has a default, so an empty JSON object (or no file at all) is
//! a valid configuration. The binary layers command-line flags on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Address the server listens on unless told otherwise.
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Body served to `GET` requests unless told otherwise.
pub const DEFAULT_BODY: &str = "hello world";

/// Errors produced while loading or validating a [`ServerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Runtime settings for [`Server`](crate::server::Server).
///
/// # Examples
///
/// ```
/// use tinyhttpd::config::ServerConfig;
///
/// let config = ServerConfig::from_json_str(r#"{ "body": "Hello, World!" }"#).unwrap();
/// assert_eq!(config.body, "Hello, World!");
/// assert_eq!(config.addr, "127.0.0.1:8080");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// `host:port` to bind; the host may be a name that resolves to several addresses.
    pub addr: String,
    /// Body served to `GET` requests.
    pub body: String,
    /// Connections served at once; further clients wait in the accept backlog.
    pub max_connections: usize,
    /// Largest request (head + body) accepted, in bytes.
    pub max_request_size: usize,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    /// How long shutdown waits for in-flight connections.
    pub shutdown_grace_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_owned(),
            body: DEFAULT_BODY.to_owned(),
            max_connections: 1000,
            max_request_size: 8 * 1024 * 1024,
            read_timeout_secs: 30,
            write_timeout_secs: 30,
            shutdown_grace_secs: 5,
        }
    }
}

impl ServerConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] on malformed JSON or unknown keys,
    /// [`ConfigError::Invalid`] if a value fails [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Checks invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.addr.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "addr",
                reason: "must not be empty",
            });
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Invalid {
                field: "max_connections",
                reason: "must be at least 1",
            });
        }
        // Semaphore permits are u32 when draining on shutdown.
        if u32::try_from(self.max_connections).is_err() {
            return Err(ConfigError::Invalid {
                field: "max_connections",
                reason: "must fit in 32 bits",
            });
        }
        if self.max_request_size == 0 {
            return Err(ConfigError::Invalid {
                field: "max_request_size",
                reason: "must be at least 1",
            });
        }
        if self.read_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "read_timeout_secs",
                reason: "must be at least 1 second",
            });
        }
        if self.write_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "write_timeout_secs",
                reason: "must be at least 1 second",
            });
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
