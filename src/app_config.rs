use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::translation::PrecisionMode;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory of input JSON documents
    pub input_dir: PathBuf,

    /// Directory translated documents are written to
    pub output_dir: PathBuf,

    /// Target language code (e.g. "DE")
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Characters held back below the hard quota
    #[serde(default = "default_safety_margin")]
    pub safety_margin: u64,

    /// Persistent translation cache file
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Persistent run-state file
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Persist cache/state every N translated strings
    #[serde(default = "default_save_every")]
    pub save_every: u64,

    /// Overwrite already translated output files
    #[serde(default)]
    pub overwrite: bool,

    /// Whether 'name' fields are sent for translation
    #[serde(default = "default_translate_names")]
    pub translate_names: bool,

    /// Unit-conversion ratio selection
    #[serde(default)]
    pub precision: PrecisionMode,

    /// Glossary normalization JSON file
    #[serde(default = "default_glossary_path")]
    pub glossary_path: PathBuf,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Config {
    /// Create a config for the given directories with defaults everywhere else.
    pub fn new(input_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_dir,
            output_dir,
            target_language: default_target_language(),
            safety_margin: default_safety_margin(),
            cache_path: default_cache_path(),
            state_path: default_state_path(),
            save_every: default_save_every(),
            overwrite: false,
            translate_names: default_translate_names(),
            precision: PrecisionMode::default(),
            glossary_path: default_glossary_path(),
            log_level: LogLevel::default(),
        }
    }

    /// Validate the configuration surface.
    pub fn validate(&self) -> Result<()> {
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language must not be empty"));
        }
        if !self.input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", self.input_dir));
        }
        if self.save_every == 0 {
            return Err(anyhow!("Save interval must be at least 1"));
        }
        Ok(())
    }
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
}

impl LogLevel {
    /// Convert to the log crate's level filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_target_language() -> String {
    "DE".to_string()
}

fn default_safety_margin() -> u64 {
    15_000
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("translation_cache.json")
}

fn default_state_path() -> PathBuf {
    PathBuf::from("translation_state.json")
}

fn default_save_every() -> u64 {
    50
}

fn default_translate_names() -> bool {
    true
}

fn default_glossary_path() -> PathBuf {
    PathBuf::from("glossary_de.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_shouldFillDefaults() {
        let config = Config::new(PathBuf::from("in"), PathBuf::from("out"));
        assert_eq!(config.target_language, "DE");
        assert_eq!(config.safety_margin, 15_000);
        assert_eq!(config.save_every, 50);
        assert!(config.translate_names);
        assert!(!config.overwrite);
        assert_eq!(config.precision, PrecisionMode::GameFriendly);
    }

    #[test]
    fn test_validate_shouldRejectMissingInputDir() {
        let config = Config::new(PathBuf::from("definitely/not/here"), PathBuf::from("out"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_shouldAcceptExistingInputDir() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path().to_path_buf(), dir.path().join("out"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_shouldApplyFieldDefaults() {
        let config: Config =
            serde_json::from_str(r#"{"input_dir": "in", "output_dir": "out"}"#).unwrap();
        assert_eq!(config.target_language, "DE");
        assert_eq!(config.log_level, LogLevel::Info);
    }

    #[test]
    fn test_deserialize_shouldReadPrecisionMode() {
        let config: Config = serde_json::from_str(
            r#"{"input_dir": "in", "output_dir": "out", "precision": "exact"}"#,
        )
        .unwrap();
        assert_eq!(config.precision, PrecisionMode::Exact);
    }
}
