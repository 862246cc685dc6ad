//! Updaters applying training labels to networks.
mod network_set;
mod sync_labels;
use crate::{FeaturesLabels, NetworkRoles};
use anyhow::Result;
pub use network_set::NetworkSet;
pub use sync_labels::{SyncLabelsUpdater, SyncUpdaterConfig};

/// Owns the networks of a learning agent and applies updates to them.
pub trait NeuralNetUpdater<N>: NetworkRoles<N> {
    /// Applies a training step computed from `fl`.
    fn update(&mut self, fl: FeaturesLabels) -> Result<()>;

    /// Brings the current network up to date with the parameters it learns from.
    ///
    /// This is a no-op for updaters training the current network in place.
    fn synchronize_current(&mut self) -> Result<()>;

    /// Resets the state of a recurrent current network.
    fn reset_current(&mut self);
}
