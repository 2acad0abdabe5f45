//! Configuration loading
//!
//! Settings are read from a TOML file in the platform's configuration
//! directory. Missing files and missing keys fall back to defaults, and the
//! credentials can be overridden from the environment so they need not be
//! written to disk.

use crate::search_strings::DEFAULT_NAMING_PATTERN;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the TorrentLeech username
pub const ENV_TORRENTLEECH_USERNAME: &str = "FEED_SCOUT_TORRENTLEECH_USERNAME";

/// Environment variable overriding the TorrentLeech password
pub const ENV_TORRENTLEECH_PASSWORD: &str = "FEED_SCOUT_TORRENTLEECH_PASSWORD";

/// Errors that can occur while loading the configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine the configuration directory location
    #[error("Failed to determine configuration directory location")]
    ConfigDirectoryNotFound,

    /// Failed to read the configuration file
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML
    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub http: HttpConfig,
    pub torrentleech: TorrentLeechConfig,
    pub torrentz: TorrentzConfig,
}

/// Search string settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Season/episode token pattern, e.g. `S{seasonnumber:02}E{episodenumber:02}`
    pub naming_pattern: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            naming_pattern: DEFAULT_NAMING_PATTERN.to_string(),
        }
    }
}

/// HTTP timeouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Budget for a single search request in seconds
    pub request_timeout_secs: u64,
    /// Budget for the login request in seconds
    pub login_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 60,
            login_timeout_secs: 30,
        }
    }
}

/// TorrentLeech settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorrentLeechConfig {
    pub enabled: bool,
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub poll_interval_minutes: u64,
}

impl Default for TorrentLeechConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: "https://classic.torrentleech.org/".to_string(),
            username: String::new(),
            password: String::new(),
            poll_interval_minutes: 15,
        }
    }
}

/// Torrentz settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TorrentzConfig {
    pub enabled: bool,
    pub base_url: String,
    /// Number of feed pages fetched per search
    pub pages: u32,
    /// Pause between two page requests in milliseconds
    pub page_delay_ms: u64,
    pub poll_interval_minutes: u64,
}

impl Default for TorrentzConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://torrentz2.eu/".to_string(),
            pages: 2,
            page_delay_ms: 1000,
            poll_interval_minutes: 15,
        }
    }
}

impl Config {
    /// Loads the configuration from the default location
    ///
    /// Falls back to defaults if the file does not exist. Environment
    /// overrides are applied afterwards.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads the configuration from `path`, using defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        tracing::debug!("Loading config from {}", path.display());

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseFailed {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Overrides credentials with values found through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(username) = lookup(ENV_TORRENTLEECH_USERNAME) {
            tracing::debug!("Override torrentleech.username from env");
            self.torrentleech.username = username;
        }

        if let Some(password) = lookup(ENV_TORRENTLEECH_PASSWORD) {
            tracing::debug!("Override torrentleech.password from env");
            self.torrentleech.password = password;
        }
    }

    /// Returns the path of the default configuration file
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let proj_dirs = directories::ProjectDirs::from("de", "westhoffswelt", "feedscout")
            .ok_or(ConfigError::ConfigDirectoryNotFound)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.search.naming_pattern, "S{seasonnumber:02}E{episodenumber:02}");
        assert!(!config.torrentleech.enabled);
        assert!(config.torrentz.enabled);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[torrentleech]
enabled = true
username = "detective"
password = "secret"

[torrentz]
pages = 3
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();

        assert!(config.torrentleech.enabled);
        assert_eq!(config.torrentleech.username, "detective");
        assert_eq!(config.torrentleech.base_url, "https://classic.torrentleech.org/");
        assert_eq!(config.torrentz.pages, 3);
        assert_eq!(config.torrentz.page_delay_ms, 1000);
        assert_eq!(config.http, HttpConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[torrentz\npages = ").unwrap();

        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn test_env_overrides_credentials() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_TORRENTLEECH_USERNAME, "from-env"),
            (ENV_TORRENTLEECH_PASSWORD, "hunter2"),
        ]);

        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.torrentleech.username, "from-env");
        assert_eq!(config.torrentleech.password, "hunter2");
    }
}
