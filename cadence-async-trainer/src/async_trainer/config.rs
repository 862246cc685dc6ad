use anyhow::Result;
use cadence_core::{ensure_config, ConfigFile};
use serde::{Deserialize, Serialize};

/// Configuration of [`AsyncTrainer`](crate::AsyncTrainer).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct AsyncTrainerConfig {
    /// The number of worker threads.
    pub num_threads: usize,

    /// Interval of writing episode records, in episodes over all workers.
    pub record_interval: usize,
}

impl Default for AsyncTrainerConfig {
    fn default() -> Self {
        Self {
            num_threads: 4,
            record_interval: 1,
        }
    }
}

impl AsyncTrainerConfig {
    /// Sets the number of worker threads.
    pub fn num_threads(mut self, v: usize) -> Self {
        self.num_threads = v;
        self
    }

    /// Sets the interval of writing records in episodes.
    pub fn record_interval(mut self, v: usize) -> Self {
        self.record_interval = v;
        self
    }

    /// Checks the number of threads and the record interval are positive.
    pub fn validate(&self) -> Result<()> {
        ensure_config(self.num_threads >= 1, "num_threads must be at least 1")?;
        ensure_config(self.record_interval >= 1, "record_interval must be at least 1")
    }
}

impl ConfigFile for AsyncTrainerConfig {}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_async_trainer_config() -> Result<()> {
        let config = AsyncTrainerConfig::default()
            .num_threads(8)
            .record_interval(10);

        let dir = TempDir::new("async_trainer_config")?;
        let path = dir.path().join("async_trainer_config.yaml");
        println!("{:?}", path);

        config.save(&path)?;
        let config_ = AsyncTrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(AsyncTrainerConfig::default().validate().is_ok());
        assert!(AsyncTrainerConfig::default()
            .num_threads(0)
            .validate()
            .is_err());
        assert!(AsyncTrainerConfig::default()
            .record_interval(0)
            .validate()
            .is_err());
    }
}
