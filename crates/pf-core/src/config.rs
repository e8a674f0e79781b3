//! Navigator configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::navigation::DEFAULT_HISTORY_LIMIT;

/// Errors that can occur loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Behaviour switches for a [`Navigator`](crate::Navigator)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Keep built frames in the mount-cache
    pub enable_cache: bool,

    /// Page shown when a page fails to construct
    pub error_page: Option<String>,

    /// Maximum number of history entries kept
    pub max_history: usize,

    /// Show the error page for unregistered names instead of returning the error
    pub route_unknown_to_error_page: bool,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            enable_cache: true,
            error_page: Some("error".to_string()),
            max_history: DEFAULT_HISTORY_LIMIT,
            route_unknown_to_error_page: false,
        }
    }
}

impl NavigatorConfig {
    /// Load from a JSON file; absent fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nav.json");
        std::fs::write(&path, r#"{ "enable_cache": false, "max_history": 10 }"#).unwrap();

        let config = NavigatorConfig::from_json_file(&path).unwrap();
        assert!(!config.enable_cache);
        assert_eq!(config.max_history, 10);
        assert_eq!(config.error_page.as_deref(), Some("error"));
        assert!(!config.route_unknown_to_error_page);
    }

    #[test]
    fn test_errors_carry_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            NavigatorConfig::from_json_file(&missing),
            Err(ConfigError::Io { .. })
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        let err = NavigatorConfig::from_json_file(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.json"));
    }
}
