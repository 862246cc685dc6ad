//! Policies selecting actions from network outputs.
mod eps_greedy;
mod greedy;
mod stochastic;
use anyhow::Result;
pub use eps_greedy::{EpsGreedy, EpsGreedyConfig};
pub use greedy::GreedyPolicy;
pub use stochastic::StochasticPolicy;

use crate::Observation;

/// Selects the next action given the network and the current observation.
///
/// Policies only read the network. Their internal state, e.g. a random number
/// generator or a call counter, belongs to the agent owning them.
pub trait Policy<N, A> {
    /// Returns the next action.
    fn next_action(&mut self, net: &N, obs: &Observation) -> Result<A>;

    /// Returns the next action among those satisfying `is_legal`.
    ///
    /// The default implementation ignores the predicate.
    fn next_legal_action(
        &mut self,
        net: &N,
        obs: &Observation,
        is_legal: &dyn Fn(&A) -> bool,
    ) -> Result<A> {
        let _ = is_legal;
        self.next_action(net, obs)
    }
}
