//! Configuration for an inventory run

use crate::error::{InventoryError, Result};
use fileledger_db::DEFAULT_CHALLENGE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of records per insert and per worker sub-batch.
pub const DEFAULT_BATCH_SIZE: usize = 300;

/// Main configuration for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Directory the `<unix-seconds>.sqlite` store is written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Number of enrichment workers
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Records per insert batch and per worker read/update batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Salt for the table signature
    #[serde(default = "default_challenge")]
    pub challenge: String,

    /// Refuse to run without raw volume access
    #[serde(default)]
    pub require_elevated: bool,

    /// Sub-path inside the chosen root; an invalid one falls back to the root
    #[serde(default)]
    pub sub_path: Option<PathBuf>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_workers() -> usize {
    available_workers()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_challenge() -> String {
    DEFAULT_CHALLENGE.to_string()
}

/// Host parallelism, the upper bound for `workers`.
pub fn available_workers() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            workers: default_workers(),
            batch_size: default_batch_size(),
            challenge: default_challenge(),
            require_elevated: false,
            sub_path: None,
        }
    }
}

impl InventoryConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: InventoryConfig =
            toml::from_str(&content).map_err(|e| InventoryError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| InventoryError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the run cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(InventoryError::Config(
                "workers must be at least 1".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(InventoryError::Config(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.challenge.is_empty() {
            return Err(InventoryError::Config("challenge must not be empty".to_string()));
        }
        Ok(())
    }

    /// Worker count capped at the host's available parallelism.
    pub fn effective_workers(&self) -> usize {
        self.workers.clamp(1, available_workers())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = InventoryConfig::default();
        assert_eq!(config.batch_size, 300);
        assert_eq!(config.challenge, DEFAULT_CHALLENGE);
        assert!(config.workers > 0);
        assert!(!config.require_elevated);
        config.validate().unwrap();
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("fileledger.toml");
        let config = InventoryConfig {
            output_dir: PathBuf::from("/var/lib/fileledger"),
            workers: 2,
            batch_size: 50,
            challenge: "salt".to_string(),
            require_elevated: true,
            sub_path: Some(PathBuf::from("Users/alice")),
        };

        config.save(&path).unwrap();
        let parsed = InventoryConfig::load(&path).unwrap();
        assert_eq!(parsed.output_dir, config.output_dir);
        assert_eq!(parsed.workers, 2);
        assert_eq!(parsed.batch_size, 50);
        assert_eq!(parsed.challenge, "salt");
        assert!(parsed.require_elevated);
        assert_eq!(parsed.sub_path, config.sub_path);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: InventoryConfig = toml::from_str("workers = 3").unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = InventoryConfig {
            workers: 0,
            ..InventoryConfig::default()
        };
        assert!(matches!(config.validate(), Err(InventoryError::Config(_))));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let config = InventoryConfig {
            batch_size: 0,
            ..InventoryConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_effective_workers_is_capped() {
        let config = InventoryConfig {
            workers: usize::MAX,
            ..InventoryConfig::default()
        };
        assert_eq!(config.effective_workers(), available_workers());
    }
}
