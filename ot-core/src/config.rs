//! Dataset configuration for the sample store tools.
//!
//! One YAML file names the store/label artifacts, the batching parameters,
//! and the ordinal partitions handed to the batch assembler. This replaces
//! per-dataset constants baked into the tools.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Store and label index locations.
    pub dataset: DatasetConfig,
    /// Batch assembly settings.
    #[serde(default)]
    pub batching: BatchingConfig,
    /// Ordinal partitions over the store.
    #[serde(default)]
    pub partitions: PartitionsConfig,
}

/// Paths of the paired dataset artifacts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetConfig {
    /// Deduplicated store file.
    pub store: String,
    /// Label index built from that store.
    pub labels: String,
}

/// Batch assembly configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchingConfig {
    /// Samples per batch. Trailing partial batches are dropped.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Reshuffle the ordinal order at the start of every epoch.
    #[serde(default = "default_shuffle")]
    pub shuffle: bool,
    /// Base RNG seed for epoch shuffles.
    #[serde(default)]
    pub seed: u64,
}

fn default_batch_size() -> usize {
    30
}

fn default_shuffle() -> bool {
    true
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            shuffle: default_shuffle(),
            seed: 0,
        }
    }
}

/// Named ordinal partitions.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PartitionsConfig {
    #[serde(default)]
    pub train: Option<PartitionRange>,
    #[serde(default)]
    pub eval: Option<PartitionRange>,
}

/// A half-open ordinal range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PartitionRange {
    pub start: u64,
    pub end: u64,
}

impl PartitionRange {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materialize the ordinal list for the batch assembler.
    pub fn ordinals(&self) -> Vec<u64> {
        (self.start..self.end).collect()
    }
}

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }
}
