//! Loading and saving configurations.
use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// A configuration that can be stored in and restored from a YAML file.
pub trait ConfigFile: Serialize + DeserializeOwned {
    /// Constructs the configuration from a YAML file.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration as a YAML file.
    fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Returns an [`InvalidConfig`](crate::error::TrainingError::InvalidConfig) error
/// when `cond` does not hold.
pub fn ensure_config(cond: bool, msg: impl Into<String>) -> Result<()> {
    if cond {
        Ok(())
    } else {
        Err(crate::error::TrainingError::InvalidConfig(msg.into()).into())
    }
}
