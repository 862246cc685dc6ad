//! Update algorithms deriving training labels from a batch of transitions.
//!
//! Every algorithm walks the batch from the newest transition to the oldest, so a
//! return computed for transition `i` is available when transition `i - 1` is
//! processed. Labels are returned together with the batch observations in
//! chronological order.
mod actor_critic;
mod nstep_q;
mod td_target;
use crate::{config::ensure_config, FeaturesLabels, NetworkRoles, TrainingBatch};
pub use actor_critic::{ActorCriticConfig, AdvantageActorCritic};
use anyhow::Result;
pub use nstep_q::{NStepConfig, NStepQLearning};
pub use td_target::{TdTarget, TdTargetConfig};

/// Computes training labels from a batch of transitions.
pub trait UpdateAlgorithm<N, T> {
    /// Returns the features and labels for the batch.
    ///
    /// `nets` gives read access to the network being trained and to the target
    /// network used for bootstrapping.
    fn compute(&self, nets: &dyn NetworkRoles<N>, batch: &TrainingBatch<T>)
        -> Result<FeaturesLabels>;
}

fn validate_gamma(gamma: f32) -> Result<()> {
    ensure_config(
        (0.0..=1.0).contains(&gamma),
        format!("gamma must be in [0, 1], got {}", gamma),
    )
}
