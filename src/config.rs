//! Configuration management for Dora assist
//!
//! Handles loading and saving tuning options to ~/.config/dora/config.json

use crate::connection::{ConnectionMatcher, MatchRules};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Application configuration
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct AppConfig {
    /// Scheme matching rules for pasted connection strings
    #[serde(default)]
    pub matcher: MatchRules,
}

impl AppConfig {
    /// Get the config file path (~/.config/dora/config.json)
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("dora");

        Ok(config_dir.join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "using default configuration");
                Self::default()
            }
        }
    }

    /// Try to load configuration from the default location
    fn try_load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a file; `.toml` files are read as TOML, anything else as JSON
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&contents).context("Failed to parse TOML config file")?
        } else {
            serde_json::from_str(&contents).context("Failed to parse config file")?
        };

        if !config.matcher.is_valid() {
            bail!(
                "Invalid matcher threshold {} in {}",
                config.matcher.threshold,
                path.display()
            );
        }

        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration as pretty JSON
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Connection string parser using the configured rules
    pub fn connection_matcher(&self) -> ConnectionMatcher {
        ConnectionMatcher::new(self.matcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = AppConfig {
            matcher: MatchRules {
                threshold: 0.2,
                min_prefix: 3,
                min_scheme_len: 5,
            },
        };
        config.save_to(&path).unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_toml_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[matcher]\nmin_prefix = 1\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.matcher.min_prefix, 1);
        assert_eq!(config.matcher.threshold, MatchRules::default().threshold);
    }

    #[test]
    fn test_empty_json_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{}").unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"matcher": {"threshold": 0.0}}"#).unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid matcher threshold"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load_from(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_connection_matcher_uses_rules() {
        let config = AppConfig {
            matcher: MatchRules {
                min_scheme_len: 6,
                ..MatchRules::default()
            },
        };
        let matcher = config.connection_matcher();
        assert!(matcher.parse("mysql://localhost").is_none());
        assert!(matcher.parse("sqlite:///tmp/a.db").is_some());
    }
}
