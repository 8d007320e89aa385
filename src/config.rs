use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub batch: BatchConfig,
    pub archive: ArchiveConfig,
    pub tui: TuiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Wall-clock budget per scanner resumption, in milliseconds
    pub time_slice_ms: u64,
    /// Descend into symlinked directories
    pub follow_symlinks: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum number of archive/delete jobs in flight at once
    pub max_in_flight: usize,
    /// Worker threads for the job pool (0 = same as max_in_flight)
    pub worker_threads: usize,
    /// How often the CLI polls the batch, in milliseconds
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Destination folder for archives (empty = default folder)
    pub destination: String,
    /// Folder created under the user's documents directory when no destination is set
    pub default_folder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Frame tick rate in milliseconds
    pub tick_rate_ms: u64,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            time_slice_ms: 5,
            follow_symlinks: false,
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 10,
            worker_threads: 0,
            poll_interval_ms: 10,
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            destination: String::new(),
            default_folder: "Unity Project Archives".to_string(),
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self { tick_rate_ms: 16 }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location if present.
    ///
    /// An explicit path must exist. Without one, a missing default file just
    /// yields the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) if p.is_file() => p,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ParseError {
                path: path.clone(),
                source,
            })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), "Loaded config file");

        Ok(config)
    }

    /// `$XDG_CONFIG_HOME/unity-sweeper/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("unity-sweeper").join("config.toml"))
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.batch.max_in_flight == 0 {
            return Err(ConfigError::Invalid(
                "batch.max_in_flight must be at least 1".into(),
            ));
        }
        if self.batch.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "batch.poll_interval_ms must be at least 1".into(),
            ));
        }
        if self.tui.tick_rate_ms == 0 {
            return Err(ConfigError::Invalid(
                "tui.tick_rate_ms must be at least 1".into(),
            ));
        }
        if self.archive.default_folder.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "archive.default_folder must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl ScannerConfig {
    pub fn time_slice(&self) -> Duration {
        Duration::from_millis(self.time_slice_ms)
    }
}

impl BatchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Pool size actually used for jobs.
    pub fn effective_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            self.max_in_flight
        } else {
            self.worker_threads
        }
    }
}

impl ArchiveConfig {
    /// Default archive folder under the user's documents directory.
    pub fn default_destination(&self) -> PathBuf {
        dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(&self.default_folder)
    }
}

impl TuiConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scanner.time_slice_ms, 5);
        assert_eq!(config.batch.max_in_flight, 10);
        assert!(config.archive.destination.is_empty());
    }

    #[test]
    fn config_serializes_to_toml() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[scanner]"));
        assert!(toml_str.contains("[batch]"));
        assert!(toml_str.contains("[archive]"));
    }

    #[test]
    fn zero_in_flight_is_rejected() {
        let mut config = Config::default();
        config.batch.max_in_flight = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn worker_threads_default_to_cap() {
        let mut batch = BatchConfig::default();
        assert_eq!(batch.effective_worker_threads(), 10);
        batch.worker_threads = 3;
        assert_eq!(batch.effective_worker_threads(), 3);
    }

    #[test]
    fn default_destination_uses_folder_name() {
        let archive = ArchiveConfig::default();
        assert!(archive
            .default_destination()
            .ends_with("Unity Project Archives"));
    }
}
