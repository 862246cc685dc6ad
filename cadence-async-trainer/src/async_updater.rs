//! Updater sending gradients of a worker-local network to the shared networks.
use crate::SharedNetworks;
use anyhow::Result;
use cadence_core::{
    updater::NeuralNetUpdater, FeaturesLabels, NetOutputs, NetworkRoles, NeuralNet, Observation,
};
use std::sync::Arc;

/// Computes gradients on a worker-local copy and applies them to the global network.
///
/// The local copy only changes when [`synchronize_current`] copies the global
/// parameters into it, so between synchronizations a worker acts with a stale but
/// consistent network.
///
/// [`synchronize_current`]: NeuralNetUpdater::synchronize_current
pub struct AsyncGradientsUpdater<N> {
    current: N,
    shared: Arc<SharedNetworks<N>>,
}

impl<N: NeuralNet> AsyncGradientsUpdater<N> {
    /// Constructs the updater with a copy of the global network.
    pub fn build(shared: Arc<SharedNetworks<N>>) -> Result<Self> {
        let current = shared.clone_global()?;
        Ok(Self { current, shared })
    }

    /// The shared networks.
    pub fn shared(&self) -> &Arc<SharedNetworks<N>> {
        &self.shared
    }
}

impl<N: NeuralNet> NetworkRoles<N> for AsyncGradientsUpdater<N> {
    fn current(&self) -> &N {
        &self.current
    }

    fn target_output(&self, obs: &Observation) -> Result<NetOutputs> {
        self.shared.target_output(obs)
    }
}

impl<N: NeuralNet> NeuralNetUpdater<N> for AsyncGradientsUpdater<N> {
    fn update(&mut self, fl: FeaturesLabels) -> Result<()> {
        let gradients = self.current.compute_gradients(&fl)?;
        self.shared.apply_gradients(&gradients, fl.batch_size())?;
        Ok(())
    }

    fn synchronize_current(&mut self) -> Result<()> {
        self.shared.copy_global_to(&mut self.current)
    }

    fn reset_current(&mut self) {
        if self.current.is_recurrent() {
            self.current.reset();
        }
    }
}
