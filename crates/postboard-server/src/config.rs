//! Configuration loading and typed config structures for the Postboard server.
//!
//! The configuration lives in `postboard.yaml` (or the file named by
//! `POSTBOARD_CONFIG`). This module defines strongly-typed structs that
//! mirror the YAML structure, and provides a loader that reads and
//! validates the file. Every field has a default, so an absent file or an
//! empty document yields a working configuration.

use std::path::{Path, PathBuf};

use postboard_api::ServerConfig;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
///
/// Mirrors the structure of `postboard.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PostboardConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: HttpConfig,

    /// Durable store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Listing defaults.
    #[serde(default)]
    pub query: QueryConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PostboardConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `POSTBOARD_HOST` overrides `server.host`
    /// - `POSTBOARD_PORT` overrides `server.port`
    /// - `POSTBOARD_DATA_FILE` overrides `storage.data_file`
    /// - `POSTBOARD_LOG_LEVEL` overrides `logging.level`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for when no file exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if an override is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("POSTBOARD_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("POSTBOARD_PORT") {
            self.server.port = val
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("POSTBOARD_PORT={val}: {e}")))?;
        }
        if let Some(val) = lookup("POSTBOARD_DATA_FILE") {
            self.storage.data_file = PathBuf::from(val);
        }
        if let Some(val) = lookup("POSTBOARD_LOG_LEVEL") {
            self.logging.level = val;
        }
        Ok(())
    }

    /// Reject values the server cannot run with.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid(String::from("server.host is empty")));
        }
        if self.server.port == 0 {
            return Err(ConfigError::Invalid(String::from("server.port must not be 0")));
        }
        if self.storage.data_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(String::from(
                "storage.data_file is empty",
            )));
        }
        if self.query.default_page_limit < 1 {
            return Err(ConfigError::Invalid(String::from(
                "query.default_page_limit must be >= 1",
            )));
        }
        Ok(())
    }

    /// Listener settings in the shape the API crate expects.
    #[must_use]
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Durable store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the post collection.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    /// Fill an empty store with the starter posts on startup.
    #[serde(default)]
    pub seed_defaults: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            seed_defaults: false,
        }
    }
}

/// Listing defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QueryConfig {
    /// Posts per page when a request gives no `limit`.
    #[serde(default = "default_page_limit")]
    pub default_page_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_limit: default_page_limit(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    5002
}

fn default_data_file() -> PathBuf {
    PathBuf::from("data/posts.json")
}

const fn default_page_limit() -> usize {
    postboard_store::DEFAULT_PAGE_LIMIT
}

fn default_log_level() -> String {
    String::from("info")
}
