//! Synchronous updater fitting the current network to labels.
use super::{NetworkSet, NeuralNetUpdater};
use crate::{
    config::ensure_config, ConfigFile, FeaturesLabels, NetOutputs, NetworkRoles, NeuralNet,
    Observation,
};
use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};

/// Configuration of [`SyncLabelsUpdater`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SyncUpdaterConfig {
    /// Number of updates between target network refreshes.
    pub target_update_frequency: usize,
}

impl Default for SyncUpdaterConfig {
    fn default() -> Self {
        Self {
            target_update_frequency: 1000,
        }
    }
}

impl SyncUpdaterConfig {
    /// Sets the target refresh interval.
    pub fn target_update_frequency(mut self, v: usize) -> Self {
        self.target_update_frequency = v;
        self
    }

    /// Checks the refresh interval is positive.
    pub fn validate(&self) -> Result<()> {
        ensure_config(
            self.target_update_frequency >= 1,
            "target_update_frequency must be at least 1",
        )
    }
}

impl ConfigFile for SyncUpdaterConfig {}

/// Fits the current network in place and refreshes the target periodically.
pub struct SyncLabelsUpdater<N> {
    nets: NetworkSet<N>,
    target_update_frequency: usize,
    n_updates: usize,
}

impl<N: NeuralNet> SyncLabelsUpdater<N> {
    /// Constructs the updater around `network`, which also seeds the target.
    pub fn build(network: N, config: &SyncUpdaterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            nets: NetworkSet::new(network),
            target_update_frequency: config.target_update_frequency,
            n_updates: 0,
        })
    }

    /// Number of applied updates.
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    /// The networks.
    pub fn networks(&self) -> &NetworkSet<N> {
        &self.nets
    }
}

impl<N: NeuralNet> NetworkRoles<N> for SyncLabelsUpdater<N> {
    fn current(&self) -> &N {
        self.nets.current()
    }

    fn target_output(&self, obs: &Observation) -> Result<NetOutputs> {
        self.nets.target_output(obs)
    }
}

impl<N: NeuralNet> NeuralNetUpdater<N> for SyncLabelsUpdater<N> {
    fn update(&mut self, fl: FeaturesLabels) -> Result<()> {
        self.nets.current_mut().fit(&fl)?;
        self.n_updates += 1;
        if self.n_updates % self.target_update_frequency == 0 {
            self.nets.update_target();
            debug!("Updated target network at update {}", self.n_updates);
        }
        Ok(())
    }

    fn synchronize_current(&mut self) -> Result<()> {
        Ok(())
    }

    fn reset_current(&mut self) {
        self.nets.reset_current();
    }
}
