//! Ledger configuration

use crate::core::amount::Amount;
use crate::core::transaction::MINER_ADDRESS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Default mining difficulty (number of leading zero hex characters)
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Lowest difficulty the adjustment rule may fall to
pub const MIN_DIFFICULTY: u32 = 1;

/// Highest representable difficulty: every hex character of the digest
pub const MAX_DIFFICULTY: u32 = 64;

/// Number of blocks between difficulty adjustments
pub const DIFFICULTY_ADJUSTMENT_INTERVAL: u64 = 20;

/// Target time between blocks in milliseconds
pub const TARGET_BLOCK_TIME_MS: i64 = 2_000;

/// Reward credited per mined block, in base units (0.1 coin)
pub const MINING_REWARD_UNITS: i64 = 10_000_000;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Difficulty of the genesis block and of mining until the first adjustment
    pub initial_difficulty: u32,
    /// Floor for downward adjustments
    pub min_difficulty: u32,
    /// Adjust every N blocks; 0 disables adjustment
    pub adjustment_interval: u64,
    /// Expected milliseconds per block
    pub target_block_time_ms: i64,
    /// Reward minted into every sealed block
    pub mining_reward: Amount,
    /// Recipient of the mining reward
    pub payout_address: String,
    /// Require the signing key to derive to the sender address
    pub bind_sender_to_key: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            initial_difficulty: DEFAULT_DIFFICULTY,
            min_difficulty: MIN_DIFFICULTY,
            adjustment_interval: DIFFICULTY_ADJUSTMENT_INTERVAL,
            target_block_time_ms: TARGET_BLOCK_TIME_MS,
            mining_reward: Amount::from_units(MINING_REWARD_UNITS),
            payout_address: MINER_ADDRESS.to_string(),
            bind_sender_to_key: true,
        }
    }
}

impl LedgerConfig {
    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the ledger cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mining_reward.is_negative() {
            return Err(ConfigError::Invalid(format!(
                "mining_reward must not be negative, got {}",
                self.mining_reward
            )));
        }
        if !self.mining_reward.is_exact() {
            return Err(ConfigError::Invalid(format!(
                "mining_reward {} is too large",
                self.mining_reward
            )));
        }
        if self.min_difficulty > MAX_DIFFICULTY {
            return Err(ConfigError::Invalid(format!(
                "min_difficulty must be at most {}, got {}",
                MAX_DIFFICULTY, self.min_difficulty
            )));
        }
        if self.min_difficulty > self.initial_difficulty {
            return Err(ConfigError::Invalid(format!(
                "min_difficulty {} is above initial_difficulty {}",
                self.min_difficulty, self.initial_difficulty
            )));
        }
        if self.target_block_time_ms <= 0 {
            return Err(ConfigError::Invalid(format!(
                "target_block_time_ms must be positive, got {}",
                self.target_block_time_ms
            )));
        }
        Ok(())
    }

    /// Same configuration with a different starting difficulty
    pub fn with_difficulty(mut self, difficulty: u32) -> Self {
        self.initial_difficulty = difficulty;
        self
    }

    /// Same configuration paying rewards to `address`
    pub fn with_payout_address(mut self, address: &str) -> Self {
        self.payout_address = address.to_string();
        self
    }

    /// Clamp a difficulty into the configured bounds
    pub fn clamp_difficulty(&self, difficulty: u32) -> u32 {
        difficulty
            .max(self.min_difficulty.min(MAX_DIFFICULTY))
            .min(MAX_DIFFICULTY)
    }

    /// Expected wall-clock time for one adjustment window
    pub fn expected_window_ms(&self) -> i64 {
        let blocks = i64::try_from(self.adjustment_interval).unwrap_or(i64::MAX);
        blocks.saturating_mul(self.target_block_time_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.initial_difficulty, 4);
        assert_eq!(config.adjustment_interval, 20);
        assert_eq!(config.expected_window_ms(), 40_000);
        assert_eq!(config.mining_reward.to_string(), "0.1");
        assert_eq!(config.payout_address, MINER_ADDRESS);
    }

    #[test]
    fn test_clamp_difficulty() {
        let config = LedgerConfig::default();
        assert_eq!(config.clamp_difficulty(0), MIN_DIFFICULTY);
        assert_eq!(config.clamp_difficulty(7), 7);
        assert_eq!(config.clamp_difficulty(500), MAX_DIFFICULTY);
    }

    #[test]
    fn test_load_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, r#"{"initial_difficulty": 2, "mining_reward": 12.5}"#).unwrap();

        let config = LedgerConfig::from_json_file(&path).unwrap();
        assert_eq!(config.initial_difficulty, 2);
        assert_eq!(config.mining_reward, Amount::from_units(1_250_000_000));
        assert_eq!(config.adjustment_interval, DIFFICULTY_ADJUSTMENT_INTERVAL);
    }

    #[test]
    fn test_negative_reward_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, r#"{"mining_reward": -1}"#).unwrap();

        assert!(matches!(
            LedgerConfig::from_json_file(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_inconsistent_difficulty_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        fs::write(&path, r#"{"initial_difficulty": 2, "min_difficulty": 5}"#).unwrap();

        assert!(matches!(
            LedgerConfig::from_json_file(&path),
            Err(ConfigError::Invalid(_))
        ));
        assert!(LedgerConfig::default().validate().is_ok());
        let config = LedgerConfig {
            target_block_time_ms: 0,
            ..LedgerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LedgerConfig::from_json_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
