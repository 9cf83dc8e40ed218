//! Store configuration loaded from TOML.
//!
//! ```toml
//! url = "fjall:///var/lib/tablekv"
//! sync_writes = true
//!
//! [logging]
//! level = "tablekv=debug"
//! format = "json"
//! output = "stderr"
//! ```
//!
//! Every field is optional; missing ones take the [`Default`] values.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Backend used when no URL is configured.
pub const DEFAULT_URL: &str = "fjall://.tablekv";

/// Datastore settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend selector of the form `scheme://path`.
    pub url: String,
    /// Fsync the journal after every committed write transaction.
    pub sync_writes: bool,
    /// Log subscriber settings (used by the CLI).
    pub logging: LoggingConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            sync_writes: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Configuration for `url` with every other field defaulted.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Log subscriber settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `tablekv=trace`.
    pub level: String,
    pub format: LogFormat,
    /// `stderr`, `stdout`, or a file path to append to.
    pub output: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            output: "stderr".to_string(),
        }
    }
}

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() -> Result<(), ConfigError> {
        let toml = r#"
url = "fjall:///var/lib/tablekv"
sync_writes = false

[logging]
level = "tablekv=debug"
format = "json"
"#;
        let config = StoreConfig::from_str(toml)?;
        assert_eq!(config.url, "fjall:///var/lib/tablekv");
        assert!(!config.sync_writes);
        assert_eq!(config.logging.level, "tablekv=debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.output, "stderr");
        Ok(())
    }

    #[test]
    fn test_empty_config_uses_defaults() -> Result<(), ConfigError> {
        let config = StoreConfig::from_str("")?;
        assert_eq!(config.url, DEFAULT_URL);
        assert!(config.sync_writes);
        assert_eq!(config.logging.format, LogFormat::Text);
        Ok(())
    }

    #[test]
    fn test_invalid_config() {
        let err = StoreConfig::from_str("sync_writes = \"yes\"");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = StoreConfig::from_file("/nonexistent/tablekv.toml");
        assert!(matches!(err, Err(ConfigError::Io { .. })));
    }
}
