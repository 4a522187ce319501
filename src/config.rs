//! Service configuration.
//!
//! Loaded from a JSON file; every field has a default so an empty
//! object is a valid configuration running an embedded store.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::http_server::HttpServerConfig;
use crate::schema::Strictness;
use crate::store::{GatewayOptions, PoolWait};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory of schema definition files (mounted read-only)
    #[serde(default = "default_schema_dir")]
    pub schema_dir: PathBuf,

    /// Unknown-field handling mode (default: strict)
    #[serde(default)]
    pub strictness: Strictness,

    /// Connection string for the document store; absent means the
    /// embedded in-memory store
    #[serde(default)]
    pub store_url: Option<String>,

    /// Total store connection attempts per operation (default: 3)
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,

    /// Base backoff delay between attempts, in milliseconds (default: 50)
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    /// Maximum concurrent outbound store operations (default: 16)
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,

    /// Behavior when the pool is exhausted (default: queue)
    #[serde(default)]
    pub pool_wait: PoolWait,

    /// HTTP server settings
    #[serde(default)]
    pub http: HttpServerConfig,
}

fn default_schema_dir() -> PathBuf {
    PathBuf::from("./schemas")
}

fn default_retry_budget() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    50
}

fn default_pool_size() -> usize {
    16
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_dir: default_schema_dir(),
            strictness: Strictness::default(),
            store_url: None,
            retry_budget: default_retry_budget(),
            backoff_base_ms: default_backoff_base_ms(),
            pool_size: default_pool_size(),
            pool_wait: PoolWait::default(),
            http: HttpServerConfig::default(),
        }
    }
}

impl Config {
    /// Loads and validates configuration from a JSON file.
    ///
    /// A relative `schema_dir` is resolved against the config file's
    /// directory, so a deployment can move as one unit.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::new(format!("failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| ConfigError::new(format!("invalid config JSON: {}", e)))?;

        if config.schema_dir.is_relative() {
            if let Some(parent) = path.parent() {
                config.schema_dir = parent.join(&config.schema_dir);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_budget == 0 {
            return Err(ConfigError::new("retry_budget must be >= 1"));
        }
        if self.pool_size == 0 {
            return Err(ConfigError::new("pool_size must be >= 1"));
        }
        Ok(())
    }

    /// Returns gateway options derived from this configuration.
    pub fn gateway_options(&self) -> GatewayOptions {
        GatewayOptions {
            pool_size: self.pool_size,
            pool_wait: self.pool_wait,
            retry_budget: self.retry_budget,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
        }
    }
}

/// Configuration error.
#[derive(Debug, Clone)]
pub struct ConfigError {
    message: String,
}

impl ConfigError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.schema_dir, PathBuf::from("./schemas"));
        assert_eq!(config.strictness, Strictness::Strict);
        assert!(config.store_url.is_none());
        assert_eq!(config.retry_budget, 3);
        assert_eq!(config.pool_wait, PoolWait::Queue);
    }

    #[test]
    fn test_full_config_parses() {
        let raw = r#"{
            "schema_dir": "/etc/docgate/schemas",
            "strictness": "lenient",
            "store_url": "store:27017",
            "retry_budget": 5,
            "backoff_base_ms": 100,
            "pool_size": 8,
            "pool_wait": "fail_fast",
            "http": { "port": 9000 }
        }"#;
        let config: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(config.strictness, Strictness::Lenient);
        assert_eq!(config.store_url.as_deref(), Some("store:27017"));
        assert_eq!(config.pool_wait, PoolWait::FailFast);
        assert_eq!(config.http.port, 9000);

        let options = config.gateway_options();
        assert_eq!(options.retry_budget, 5);
        assert_eq!(options.backoff_base, Duration::from_millis(100));
    }

    #[test]
    fn test_zero_budget_rejected() {
        let config = Config {
            retry_budget: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("docgate.json");
        fs::write(&path, r#"{"pool_size": 4}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.pool_size, 4);
    }

    #[test]
    fn test_malformed_file_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("docgate.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
