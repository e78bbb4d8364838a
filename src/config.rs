//! Ledger configuration
//!
//! Loaded from a JSON file or built in code; every field has a default.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Maximum number of transfers committed per block
pub const DEFAULT_MAX_BATCH_SIZE: usize = 3;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Per-block transfer cap
    pub max_batch_size: usize,
    /// Participants and holdings recorded in the genesis block
    pub genesis_directory: BTreeMap<String, Vec<String>>,
    /// Seed for the miner lottery; entropy when absent
    pub seed: Option<u64>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            genesis_directory: BTreeMap::new(),
            seed: None,
        }
    }
}

impl LedgerConfig {
    /// The three demonstration participants of the first deployment
    pub fn sample() -> Self {
        let mut genesis_directory = BTreeMap::new();
        for (name, props) in [
            ("zia", ["usa", "uk", "uae"]),
            ("gia", ["delhi", "bombay", "hyd"]),
            ("tia", ["dc", "ny", "la"]),
        ] {
            genesis_directory.insert(
                name.to_string(),
                props.iter().map(|p| p.to_string()).collect(),
            );
        }

        Self {
            genesis_directory,
            ..Default::default()
        }
    }

    /// Load and validate a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        let config: LedgerConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "max_batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
