//! Current and target network of a learning agent.
use crate::{NetOutputs, NetworkRoles, NeuralNet, Observation};
use anyhow::Result;

/// A trained network and a snapshot of it used for bootstrapping.
///
/// The target is only ever replaced as a whole by [`NetworkSet::update_target`].
#[derive(Clone, Debug)]
pub struct NetworkSet<N> {
    current: N,
    target: N,
}

impl<N: NeuralNet> NetworkSet<N> {
    /// Constructs the set with the target as a copy of `current`.
    pub fn new(current: N) -> Self {
        let target = current.clone();
        Self { current, target }
    }

    /// Replaces the target network.
    pub fn with_target(mut self, target: N) -> Self {
        self.target = target;
        self
    }

    /// Mutable access to the current network.
    pub fn current_mut(&mut self) -> &mut N {
        &mut self.current
    }

    /// The target network.
    pub fn target(&self) -> &N {
        &self.target
    }

    /// Copies the parameters of the current network into the target network.
    pub fn update_target(&mut self) {
        self.target.copy_from(&self.current);
    }

    /// Resets the current network if it is recurrent.
    pub fn reset_current(&mut self) {
        if self.current.is_recurrent() {
            self.current.reset();
        }
    }
}

impl<N: NeuralNet> NetworkRoles<N> for NetworkSet<N> {
    fn current(&self) -> &N {
        &self.current
    }

    fn target_output(&self, obs: &Observation) -> Result<NetOutputs> {
        self.target.output(obs)
    }
}
