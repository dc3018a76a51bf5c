use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::model::Column;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub browser: BrowserConfig,
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Seconds a computed directory size may be reused (0 = always recompute)
    pub size_cache_ttl_secs: u64,
    /// Background sizing threads (0 = auto)
    pub worker_threads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Draw per-type glyphs instead of plain markers
    pub custom_icons: bool,
    /// Periodically re-read the visible rows
    pub watch: bool,
    /// Seconds between refreshes when watching
    pub refresh_interval_secs: u64,
    /// Spaces per tree level
    pub indent: u16,
    /// Initial sort column: name, size, type, modified
    pub default_sort: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            size_cache_ttl_secs: 0,
            worker_threads: 0,
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            custom_icons: true,
            watch: true,
            refresh_interval_secs: 2,
            indent: 2,
            default_sort: "name".to_string(),
        }
    }
}

impl BrowserConfig {
    pub fn size_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.size_cache_ttl_secs)
    }
}

impl TuiConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn sort_column(&self) -> Column {
        Column::from_name(&self.default_sort).unwrap_or_default()
    }
}

impl Config {
    /// Default config location: `$XDG_CONFIG_HOME/dirview/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dirview").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// tried and silently skipped if absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.is_file() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %path.display(), "Read configuration file");

        let config = toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.tui.indent == 0 {
            return Err(ConfigError::Invalid("tui.indent must be at least 1".into()));
        }
        if self.tui.watch && self.tui.refresh_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "tui.refresh_interval_secs must be positive when watching".into(),
            ));
        }
        if Column::from_name(&self.tui.default_sort).is_none() {
            return Err(ConfigError::Invalid(format!(
                "unknown sort column '{}'",
                self.tui.default_sort
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.browser.size_cache_ttl_secs, 0);
        assert!(config.tui.watch);
        assert!(config.tui.custom_icons);
    }

    #[test]
    fn config_serializes_to_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[browser]"));
        assert!(toml_str.contains("[tui]"));
    }

    #[test]
    fn zero_indent_is_rejected() {
        let mut config = Config::default();
        config.tui.indent = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn unknown_sort_is_rejected() {
        let mut config = Config::default();
        config.tui.default_sort = "colour".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn sort_column_parses() {
        let mut config = TuiConfig::default();
        assert_eq!(config.sort_column(), Column::Name);
        config.default_sort = "size".into();
        assert_eq!(config.sort_column(), Column::Size);
    }
}
