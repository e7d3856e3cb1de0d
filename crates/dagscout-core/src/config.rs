//! Configuration schema (dagscout.toml)

use crate::format::SourceFormat;
use serde::{Deserialize, Serialize};

/// Default content markers that flag a Python file as a pipeline definition
pub const DEFAULT_PYTHON_MARKERS: [&str; 3] = ["DAG(", "airflow", "@task"];

/// File discovery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// A `*.py` file is parsed if it contains any of these substrings.
    /// `*_dag.py` files are always parsed.
    #[serde(default = "default_python_markers")]
    pub python_markers: Vec<String>,

    /// Follow symbolic links while walking the tree
    #[serde(default)]
    pub follow_links: bool,
}

fn default_python_markers() -> Vec<String> {
    DEFAULT_PYTHON_MARKERS.iter().map(|m| m.to_string()).collect()
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            python_markers: default_python_markers(),
            follow_links: false,
        }
    }
}

impl DiscoveryConfig {
    /// Check whether Python source text looks like a pipeline definition
    pub fn is_pipeline_python(&self, content: &str) -> bool {
        self.python_markers
            .iter()
            .any(|marker| content.contains(marker.as_str()))
    }
}

/// Per-format switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatToggles {
    /// Formats whose parser is skipped
    #[serde(default)]
    pub disabled: Vec<SourceFormat>,
}

impl FormatToggles {
    pub fn is_enabled(&self, format: SourceFormat) -> bool {
        !self.disabled.contains(&format)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// File discovery settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Format switches
    #[serde(default)]
    pub formats: FormatToggles,
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),
}
