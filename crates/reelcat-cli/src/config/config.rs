//! `AppConfig` struct and TOML loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reelcat_db::{AppDir, app_file};
use serde::{Deserialize, Serialize};

/// Config file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable that overrides `[catalog].api_key`.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default search debounce in milliseconds.
const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Resolves `config.toml` under `dir`, or under the user config directory.
///
/// # Errors
///
/// Returns an error if `dir` is `None` and the config directory is unknown.
pub fn resolve_config_path(dir: Option<&PathBuf>) -> Result<PathBuf> {
    app_file(dir, AppDir::Config, CONFIG_FILE_NAME)
}

/// Top-level application configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Catalog API connection settings.
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// Search behaviour.
    #[serde(default)]
    pub search: SearchConfig,
}

/// Catalog API connection settings.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Overrides the API base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Response language (e.g. "en-US").
    #[serde(default)]
    pub language: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// API key; `TMDB_API_KEY` takes precedence.
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            language: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

impl CatalogConfig {
    /// Picks the API key: a non-empty environment value wins over the file.
    #[must_use]
    pub fn resolve_api_key(&self, env_value: Option<String>) -> Option<String> {
        env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_key.clone())
            .filter(|v| !v.trim().is_empty())
    }
}

/// Search behaviour.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke, in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found; using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert_eq!(config.catalog.timeout_secs, 15);
        assert_eq!(config.search.debounce_ms, 500);
        assert!(config.catalog.base_url.is_none());
        assert!(config.catalog.api_key.is_none());
    }

    #[test]
    fn test_resolve_config_path_with_dir() {
        // Arrange
        let dir = PathBuf::from("/tmp/reelcat-home");

        // Act
        let path = resolve_config_path(Some(&dir)).unwrap();

        // Assert
        assert_eq!(path, PathBuf::from("/tmp/reelcat-home/config.toml"));
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_empty_file_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_full_config() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[catalog]
base_url = "http://127.0.0.1:8080/3/"
language = "ja-JP"
timeout_secs = 5
api_key = "file-key"

[search]
debounce_ms = 250
"#,
        )
        .unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(
            config.catalog.base_url.as_deref(),
            Some("http://127.0.0.1:8080/3/")
        );
        assert_eq!(config.catalog.language.as_deref(), Some("ja-JP"));
        assert_eq!(config.catalog.timeout_secs, 5);
        assert_eq!(config.catalog.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.search.debounce_ms, 250);
    }

    #[test]
    fn test_load_partial_section_keeps_defaults() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[catalog]\nlanguage = \"en-US\"\n").unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config.catalog.timeout_secs, 15);
        assert_eq!(config.search.debounce_ms, 500);
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[catalog\n").unwrap();

        // Act
        let result = AppConfig::load(&path);

        // Assert
        assert!(result.is_err());
    }

    #[test]
    fn test_api_key_env_takes_precedence() {
        // Arrange
        let config = CatalogConfig {
            api_key: Some(String::from("file-key")),
            ..CatalogConfig::default()
        };

        // Act & Assert
        assert_eq!(
            config.resolve_api_key(Some(String::from("env-key"))).as_deref(),
            Some("env-key")
        );
        assert_eq!(
            config.resolve_api_key(Some(String::new())).as_deref(),
            Some("file-key")
        );
        assert_eq!(config.resolve_api_key(None).as_deref(), Some("file-key"));
        assert!(CatalogConfig::default().resolve_api_key(None).is_none());
    }
}
