//! Errors raised while loading, validating, or persisting configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read configuration file: {0}")]
    FileRead(String),

    /// The configuration file could not be written
    #[error("failed to write configuration file: {0}")]
    FileWrite(String),

    /// The file contents are not valid TOML for [`Config`](super::Config)
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// The configuration could not be rendered as TOML
    #[error("failed to serialize configuration: {0}")]
    Serialize(String),

    /// A single environment override did not parse
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),

    /// Cross-field checks in `Config::validate` rejected the configuration
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::Validation("store.users_namespace must not be empty".to_string());
        assert_eq!(
            err.to_string(),
            "configuration validation failed: store.users_namespace must not be empty"
        );

        let err = ConfigError::InvalidValue("invalid JSON flag: true-ish".to_string());
        assert!(err.to_string().contains("invalid configuration value"));
    }
}
