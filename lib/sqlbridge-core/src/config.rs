///
/// # Runtime Configuration
///
/// Settings are read from a TOML file. Every section and key is optional;
/// anything omitted keeps its default.
///
/// ## Example sqlbridge.toml
///
/// ```toml
/// [ownership]
/// track_releases = true
///
/// [sequence]
/// materialize_limit = 1000000
///
/// [blob]
/// segment_size = 4096
///
/// [database]
/// busy_timeout_ms = 5000
///
/// [logging]
/// filter = "sqlbridge=debug"
/// ```
///

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub ownership: OwnershipConfig,
    pub sequence: SequenceConfig,
    pub blob: BlobConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OwnershipConfig {
    /// Reject releases made through an allocator that does not own the value.
    pub track_releases: bool,
}

impl Default for OwnershipConfig {
    fn default() -> Self {
        Self {
            track_releases: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SequenceConfig {
    pub materialize_limit: usize,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            materialize_limit: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BlobConfig {
    pub segment_size: usize,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            segment_size: crate::blob::DEFAULT_SEGMENT_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

pub fn parse_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_str(&content)
}

pub fn parse_config_str(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    if config.blob.segment_size == 0 {
        return Err(ConfigError::Invalid(
            "blob.segment_size must be greater than zero".to_string(),
        ));
    }
    Ok(config)
}
