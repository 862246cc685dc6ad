//! Advantage actor-critic.
use super::{validate_gamma, UpdateAlgorithm};
use crate::{
    error::TrainingError, ActionSpace, ConfigFile, FeaturesLabels, Labels, NetworkRoles,
    NeuralNet, StateActionReward, TrainingBatch, POLICY, VALUE,
};
use anyhow::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Configuration of [`AdvantageActorCritic`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ActorCriticConfig {
    /// Discount factor.
    pub gamma: f32,
}

impl Default for ActorCriticConfig {
    fn default() -> Self {
        Self { gamma: 0.99 }
    }
}

impl ActorCriticConfig {
    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Checks the discount factor.
    pub fn validate(&self) -> Result<()> {
        validate_gamma(self.gamma)
    }
}

impl ConfigFile for ActorCriticConfig {}

/// Advantage actor-critic labels.
///
/// The `Value` label of a transition is its discounted return `v`, bootstrapped from
/// the current network's value at the final observation. The `Policy` label is zero
/// except at the taken action, where it holds the advantage `v - V(s)`.
#[derive(Clone, Debug)]
pub struct AdvantageActorCritic<S> {
    space: S,
    gamma: f32,
}

impl<S: ActionSpace> AdvantageActorCritic<S> {
    /// Constructs the algorithm.
    pub fn build(space: S, config: &ActorCriticConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            space,
            gamma: config.gamma,
        })
    }
}

impl<N, S> UpdateAlgorithm<N, StateActionReward<S::Action>> for AdvantageActorCritic<S>
where
    N: NeuralNet,
    S: ActionSpace,
{
    fn compute(
        &self,
        nets: &dyn NetworkRoles<N>,
        batch: &TrainingBatch<StateActionReward<S::Action>>,
    ) -> Result<FeaturesLabels> {
        let last = batch.transitions().last().ok_or(TrainingError::EmptyBatch)?;
        let net = nets.current();
        let mut v = if last.is_terminal {
            0.0
        } else {
            let obs = batch
                .final_observation()
                .ok_or(TrainingError::MissingFinalObservation)?;
            net.output(obs)?.get(VALUE)?[0]
        };

        let n = batch.len();
        let mut values = Array2::<f32>::zeros((n, 1));
        let mut advantages = Array2::<f32>::zeros((n, self.space.size()));
        for (i, t) in batch.iter().enumerate().rev() {
            let ix = self.space.action_index(&t.action)?;
            v = t.reward + if t.is_terminal { 0.0 } else { self.gamma * v };
            let predicted = net.output(&t.obs)?.get(VALUE)?[0];
            values[[i, 0]] = v;
            advantages[[i, ix]] = v - predicted;
        }

        let mut l = Labels::new();
        l.insert(VALUE, values);
        l.insert(POLICY, advantages);
        Ok(FeaturesLabels::new(
            batch.iter().map(|t| t.obs.clone()).collect(),
            l,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        dummy::DummyNet, updater::NetworkSet, DiscreteAction, DiscreteActionSpace, Observation,
    };

    fn obs(t: f32) -> Observation {
        Observation::from_vec("state", vec![t])
    }

    #[test]
    fn test_actor_critic_labels() {
        let alg = AdvantageActorCritic::build(
            DiscreteActionSpace::new(3),
            &ActorCriticConfig::default().gamma(0.5),
        )
        .unwrap();
        let nets = NetworkSet::new(DummyNet::with_actor_critic(2.0, vec![0.2, 0.3, 0.5]));
        let batch = TrainingBatch::new(
            vec![
                StateActionReward::new(obs(0.0), DiscreteAction(2), 1.0, false),
                StateActionReward::new(obs(1.0), DiscreteAction(0), 0.0, false),
            ],
            Some(obs(2.0)),
        );
        let fl = alg.compute(&nets, &batch).unwrap();
        let values = fl.labels.get(VALUE).unwrap();
        let adv = fl.labels.get(POLICY).unwrap();

        // v1 = 0 + 0.5 * 2, v0 = 1 + 0.5 * v1
        assert_eq!(values[[1, 0]], 1.0);
        assert_eq!(values[[0, 0]], 1.5);
        assert_eq!(adv.row(1).to_vec(), vec![-1.0, 0.0, 0.0]);
        assert_eq!(adv.row(0).to_vec(), vec![0.0, 0.0, -0.5]);
    }

    #[test]
    fn test_terminal_bootstrap() {
        let config = ActorCriticConfig::default();
        let alg = AdvantageActorCritic::build(DiscreteActionSpace::new(2), &config).unwrap();
        let nets = NetworkSet::new(DummyNet::with_actor_critic(10.0, vec![0.5, 0.5]));
        let batch = TrainingBatch::new(
            vec![StateActionReward::new(obs(0.0), DiscreteAction(1), 3.0, true)],
            None,
        );
        let fl = alg.compute(&nets, &batch).unwrap();
        assert_eq!(fl.labels.get(VALUE).unwrap()[[0, 0]], 3.0);
        assert_eq!(fl.labels.get(POLICY).unwrap()[[0, 1]], -7.0);

        let err = alg.compute(&nets, &TrainingBatch::empty()).unwrap_err();
        assert_eq!(err.downcast_ref::<TrainingError>(), Some(&TrainingError::EmptyBatch));
    }
}
