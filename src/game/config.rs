use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the playable area
    pub grid_width: usize,
    /// Height of the playable area
    pub grid_height: usize,
    /// Body segments trailing the head at the start of a game
    pub initial_body_length: usize,
    /// Tick interval when a game starts
    pub initial_interval_ms: u64,
    /// How much each eaten food shortens the interval
    pub interval_step_ms: u64,
    /// The interval never drops below this
    pub min_interval_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_width: 100,
            grid_height: 18,
            initial_body_length: 3,
            initial_interval_ms: 200,
            interval_step_ms: 20,
            min_interval_ms: 10,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Load a JSON config file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "grid must be at least 1x1, got {}x{}",
                self.grid_width, self.grid_height
            )));
        }
        if i32::try_from(self.grid_width).is_err() || i32::try_from(self.grid_height).is_err() {
            return Err(ConfigError::Invalid("grid dimensions exceed i32 range".into()));
        }
        if self.initial_interval_ms == 0 || self.min_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick intervals must be positive".into()));
        }
        let cells = self.grid_width.saturating_mul(self.grid_height);
        if self.initial_body_length > cells {
            return Err(ConfigError::Invalid(format!(
                "initial body length {} does not fit a {}x{} grid",
                self.initial_body_length, self.grid_width, self.grid_height
            )));
        }
        if self.min_interval_ms > self.initial_interval_ms {
            return Err(ConfigError::Invalid(format!(
                "minimum interval {}ms exceeds initial interval {}ms",
                self.min_interval_ms, self.initial_interval_ms
            )));
        }
        Ok(())
    }

    pub fn initial_interval(&self) -> Duration {
        Duration::from_millis(self.initial_interval_ms)
    }
}
