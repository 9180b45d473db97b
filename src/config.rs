//! Buffer pool configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, Result};
use crate::storage::buffer_pool::ReplacementStrategy;

/// Default number of frames in a buffer pool.
pub const DEFAULT_NUM_FRAMES: usize = 64;

/// Configuration for opening a buffer pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferPoolConfig {
    /// Path to the backing page file.
    pub page_file: PathBuf,

    /// Number of page frames in the buffer pool.
    #[serde(default = "default_num_frames")]
    pub num_frames: usize,

    /// Page replacement strategy.
    #[serde(default)]
    pub strategy: ReplacementStrategy,

    /// Create a one-page file if the page file does not exist.
    #[serde(default)]
    pub create_if_missing: bool,
}

fn default_num_frames() -> usize {
    DEFAULT_NUM_FRAMES
}

impl BufferPoolConfig {
    /// Creates a configuration for `page_file` with default settings.
    #[must_use]
    pub fn new(page_file: impl Into<PathBuf>) -> Self {
        Self {
            page_file: page_file.into(),
            num_frames: DEFAULT_NUM_FRAMES,
            strategy: ReplacementStrategy::default(),
            create_if_missing: false,
        }
    }

    /// Sets the number of frames.
    #[must_use]
    pub fn with_num_frames(mut self, num_frames: usize) -> Self {
        self.num_frames = num_frames;
        self
    }

    /// Sets the replacement strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: ReplacementStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enables or disables creating a missing page file.
    #[must_use]
    pub fn with_create_if_missing(mut self, enabled: bool) -> Self {
        self.create_if_missing = enabled;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the pool would have no frames or no file.
    pub fn validate(&self) -> Result<()> {
        if self.num_frames == 0 {
            return Err(PoolError::InvalidConfig(
                "num_frames must be greater than 0".into(),
            ));
        }
        if self.page_file.as_os_str().is_empty() {
            return Err(PoolError::InvalidConfig("page_file must be set".into()));
        }
        Ok(())
    }

    /// Parses a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the text is not a valid configuration.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PoolError::InvalidConfig(e.to_string()))
    }

    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PoolError::StorageError(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Converts the configuration to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PoolError::InvalidConfig(e.to_string()))
    }
}
