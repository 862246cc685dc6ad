//! Configuration of [`SyncTrainer`](super::SyncTrainer).
use crate::{config::ensure_config, ConfigFile};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration of [`SyncTrainer`](super::SyncTrainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SyncTrainerConfig {
    /// Interval of writing episode records, in episodes.
    pub record_interval: usize,
}

impl Default for SyncTrainerConfig {
    fn default() -> Self {
        Self { record_interval: 1 }
    }
}

impl SyncTrainerConfig {
    /// Sets the interval of writing records in episodes.
    pub fn record_interval(mut self, v: usize) -> Self {
        self.record_interval = v;
        self
    }

    /// Checks the record interval is positive.
    pub fn validate(&self) -> Result<()> {
        ensure_config(self.record_interval >= 1, "record_interval must be at least 1")
    }
}

impl ConfigFile for SyncTrainerConfig {}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_sync_trainer_config() -> Result<()> {
        let config = SyncTrainerConfig::default().record_interval(10);

        let dir = TempDir::new("sync_trainer_config")?;
        let path = dir.path().join("sync_trainer_config.yaml");
        println!("{:?}", path);

        config.save(&path)?;
        let config_ = SyncTrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
