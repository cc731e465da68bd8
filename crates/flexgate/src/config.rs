//! Gateway configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path};
use thiserror::Error as ThisError;

/// Default cap on the size of one serialized request envelope.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// Config
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub gateway: GatewayConfig,
    pub logging: LoggingConfig,
}

impl Config {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&source)
    }
}

///
/// GatewayConfig
///
/// `debug` puts the formatted trace into fault details. Frames are captured
/// either way.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewayConfig {
    pub debug: bool,
    pub max_request_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            debug: false,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

///
/// LoggingConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string, e.g. `"info,flexgate=debug"`.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();

        assert_eq!(config, Config::default());
        assert!(!config.gateway.debug);
        assert_eq!(config.gateway.max_request_bytes, 1_048_576);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::from_toml_str(
            r#"
            [gateway]
            debug = true
            max_request_bytes = 4096

            [logging]
            filter = "flexgate=debug"
            "#,
        )
        .unwrap();

        assert!(config.gateway.debug);
        assert_eq!(config.gateway.max_request_bytes, 4096);
        assert_eq!(config.logging.filter, "flexgate=debug");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml_str("[gateway]\nverbose = true\n").unwrap_err();

        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = Config::load("/nonexistent/flexgate.toml").unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/flexgate.toml"));
    }
}
