//! Lifecycle settings schema

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default deadline for each of the start and stop phases in `Graph::run`.
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Settings that shape how a graph is started and stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Deadline for the start phase in `Graph::run`
    pub start_timeout_ms: u64,

    /// Deadline for the stop phase in `Graph::run`
    pub stop_timeout_ms: u64,

    /// What to do when a Stop or Close call fails
    pub stop_policy: StopPolicy,

    /// How members of one level are invoked
    pub level_execution: LevelExecution,

    /// What happens to a phase that outlives its context
    pub on_timeout: TimeoutPolicy,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            start_timeout_ms: DEFAULT_TIMEOUT_MS,
            stop_timeout_ms: DEFAULT_TIMEOUT_MS,
            stop_policy: StopPolicy::default(),
            level_execution: LevelExecution::default(),
            on_timeout: TimeoutPolicy::default(),
        }
    }
}

/// Stop phase failure handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StopPolicy {
    /// Return on the first failure, leaving the remaining nodes running (default)
    #[default]
    FailFast,
    /// Keep tearing down the remaining nodes and report every failure
    BestEffort,
}

/// Invocation of the members of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LevelExecution {
    /// One node at a time (default)
    #[default]
    Sequential,
    /// All members together; the level completes before the next begins
    Concurrent,
}

/// Fate of a phase whose context is done before it finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Stop waiting and let the phase run on in the background (default)
    #[default]
    Abandon,
    /// Abort the phase task at its next suspension point
    Abort,
}

impl LifecycleConfig {
    pub fn start_timeout(&self) -> Duration {
        Duration::from_millis(self.start_timeout_ms)
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_millis(self.stop_timeout_ms)
    }

    /// Load settings from a YAML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            source: e,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse settings from YAML string
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: LifecycleConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "'start_timeout_ms' must be greater than zero".to_string(),
            ));
        }
        if self.stop_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "'stop_timeout_ms' must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}
