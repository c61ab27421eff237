//! Configuration
//!
//! Settings shared by the three role binaries.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Exchange configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// KEM algorithm identifier, e.g. "Kyber512"
    #[serde(default = "default_algorithm")]
    pub algorithm: String,
    /// Directory holding the exchanged artifacts
    #[serde(default = "default_artifact_dir")]
    pub artifact_dir: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_algorithm() -> String {
    "Kyber512".to_string()
}

fn default_artifact_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            algorithm: default_algorithm(),
            artifact_dir: default_artifact_dir(),
            log_level: default_log_level(),
        }
    }
}

impl ExchangeConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}
