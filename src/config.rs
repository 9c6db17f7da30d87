//! Configuration for the cache and sync engine, from an optional TOML file.
//!
//! A missing file yields `Config::default()`. Every key carries
//! `#[serde(default)]`, so any subset can be specified.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Configuration
// ============================================================================

/// Tunables for the sync engine and the HTTP story source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hacker News API base URL.
    pub api_base_url: String,

    /// Stories a sync aims to resolve per section.
    pub max_items: usize,

    /// Retention cap for the bounded sections.
    pub max_retained: usize,

    /// Concurrent item fetches during a sync.
    pub fetch_workers: usize,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "https://hacker-news.firebaseio.com/v0".to_string(),
            max_items: 40,
            max_retained: 30,
            fetch_workers: 10,
            request_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior)
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(toml::from_str(&contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_public_api() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "https://hacker-news.firebaseio.com/v0");
        assert_eq!(config.max_items, 40);
        assert_eq!(config.max_retained, 30);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = toml::from_str("max_items = 5").unwrap();
        assert_eq!(config.max_items, 5);
        assert_eq!(config.max_retained, 30);
        assert_eq!(config.fetch_workers, 10);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config: Config = toml::from_str("somebody_elses_key = true").unwrap();
        assert_eq!(config.max_items, 40);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(toml::from_str::<Config>("max_items = [").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let config = Config::load(Path::new("/nonexistent/paperboy.toml")).unwrap();
        assert_eq!(config.max_items, 40);
    }
}
