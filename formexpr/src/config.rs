//! Engine configuration, loaded from TOML
//!
//! ```toml
//! standard_library = true
//!
//! [variables]
//! company = "Acme"
//! limits = { max_items = 10 }
//!
//! [suggestions]
//! max_sample_chars = 20
//! limit = 50
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::value::Map;

/// Top-level engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed the registry with the standard function library
    pub standard_library: bool,
    /// Variables registered when the engine is created
    pub variables: Map,
    pub suggestions: SuggestionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            standard_library: true,
            variables: Map::new(),
            suggestions: SuggestionConfig::default(),
        }
    }
}

/// Tuning for generated suggestions
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Strings longer than this are truncated in sample values
    pub max_sample_chars: usize,
    /// Objects with more keys than this are truncated in sample values
    pub max_sample_keys: usize,
    /// Maximum number of suggestions returned for a partial expression
    pub limit: Option<usize>,
    /// Fall back to fuzzy matching when no suggestion matches by prefix
    pub fuzzy_fallback: bool,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_sample_chars: 20,
            max_sample_keys: 3,
            limit: None,
            fuzzy_fallback: true,
        }
    }
}

/// Failure to read or parse a configuration file
#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "invalid config {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl EngineConfig {
    /// Parse configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "Loaded config from {} ({} variables)",
            path.display(),
            config.variables.len()
        );
        Ok(config)
    }

    /// Load the default config file, falling back to defaults when it does
    /// not exist
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// `~/.config/formexpr/config.toml` (platform config directory)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("formexpr")
            .join("config.toml")
    }
}
