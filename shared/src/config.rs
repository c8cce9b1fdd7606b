//! Viewer configuration.
//!
//! Loaded from `~/.patrol_viewer/viewer.json` (directory overridable via
//! `PATROL_VIEWER_CONFIG_DIR`), falling back to defaults when no file
//! exists. Command-line flags layer on top of whatever was loaded.

use crate::geo::BoundingBox;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_DIR_ENV: &str = "PATROL_VIEWER_CONFIG_DIR";
const CONFIG_FILE: &str = "viewer.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Runtime parameters for the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Base URL of the simulation backend
    pub backend_url: String,
    /// Poll period in milliseconds
    pub poll_interval_ms: u64,
    /// Per-request timeout in milliseconds; must stay below the poll
    /// interval so a stalled request cannot back up behind the next tick
    pub fetch_timeout_ms: u64,
    /// Window for the particle query and density rendering
    pub bounding_box: BoundingBox,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_ms: 3000,
            fetch_timeout_ms: 2000,
            bounding_box: BoundingBox::default(),
        }
    }
}

impl ViewerConfig {
    /// Default config file location, honoring the directory override.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir).join(CONFIG_FILE));
        }
        let home = std::env::var("HOME")
            .map_err(|_| ConfigError::Invalid("HOME not set".to_string()))?;
        Ok(PathBuf::from(home).join(".patrol_viewer").join(CONFIG_FILE))
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the default file if present, otherwise return defaults.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Write the config to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend_url.is_empty() {
            return Err(ConfigError::Invalid("backend_url is empty".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        if self.fetch_timeout_ms >= self.poll_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "fetch_timeout_ms ({}) must be below poll_interval_ms ({})",
                self.fetch_timeout_ms, self.poll_interval_ms
            )));
        }
        if !self.bounding_box.is_valid() {
            return Err(ConfigError::Invalid(
                "bounding_box is not a finite, ordered window".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
