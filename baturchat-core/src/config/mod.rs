//! Configuration management for BaturChat
//!
//! Environment-based configuration with defaults, TOML file support, and
//! validation.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Auth service configuration
    pub auth: AuthConfig,

    /// Realtime store configuration
    pub store: StoreConfig,

    /// Session cache configuration
    pub cache: CacheConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Auth service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Backend project identifier
    pub project_id: String,

    /// API key for the auth backend, if required
    pub api_key: Option<String>,

    /// Per-request timeout applied by the backend client
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

/// Realtime store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Realtime database URL
    pub database_url: String,

    /// Namespace for user records
    pub users_namespace: String,

    /// Per-request timeout applied by the backend client
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

/// Session cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Directory for the persisted session cache entry
    pub dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include target module
    pub with_target: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            project_id: "baturchat-dev".to_string(),
            api_key: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "http://127.0.0.1:9000".to_string(),
            users_namespace: "users".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("./data") }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_target: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Environment variables follow the pattern: BATURCHAT_<SECTION>_<KEY>
    /// Example: BATURCHAT_STORE_DATABASE_URL=https://db.example.com
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Auth config
        if let Ok(project_id) = env::var("BATURCHAT_AUTH_PROJECT_ID") {
            config.auth.project_id = project_id;
        }
        if let Ok(api_key) = env::var("BATURCHAT_AUTH_API_KEY") {
            config.auth.api_key = Some(api_key);
        }

        // Store config
        if let Ok(url) = env::var("BATURCHAT_STORE_DATABASE_URL") {
            config.store.database_url = url;
        }
        if let Ok(namespace) = env::var("BATURCHAT_STORE_USERS_NAMESPACE") {
            config.store.users_namespace = namespace;
        }

        // Cache config
        if let Ok(dir) = env::var("BATURCHAT_CACHE_DIR") {
            config.cache.dir = PathBuf::from(dir);
        }

        // Logging config
        if let Ok(level) = env::var("BATURCHAT_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = env::var("BATURCHAT_LOG_JSON") {
            config.logging.json_format = json
                .parse()
                .map_err(|e| ConfigError::InvalidValue(format!("Invalid JSON flag: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead(e.to_string()))?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.project_id.is_empty() {
            return Err(ConfigError::Validation(
                "auth.project_id must not be empty".to_string(),
            ));
        }

        if self.store.database_url.is_empty() {
            return Err(ConfigError::Validation(
                "store.database_url must not be empty".to_string(),
            ));
        }

        if self.store.users_namespace.is_empty() {
            return Err(ConfigError::Validation(
                "store.users_namespace must not be empty".to_string(),
            ));
        }

        if self.auth.request_timeout.is_zero() || self.store.request_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "request timeouts must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWrite(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.store.users_namespace, "users");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.store.users_namespace = String::new();
        assert!(config.validate().is_err());

        config = Config::default();
        config.auth.project_id = String::new();
        assert!(config.validate().is_err());

        config = Config::default();
        config.auth.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_log_level_validation() {
        let mut config = Config::default();

        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "debug".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.logging.level = "debug".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.logging.level, "debug");
        assert_eq!(loaded.store.database_url, config.store.database_url);
    }
}
