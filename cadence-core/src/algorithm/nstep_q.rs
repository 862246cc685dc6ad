//! N-step Q-learning.
use super::{td_target::check_len, validate_gamma, UpdateAlgorithm};
use crate::{
    error::TrainingError, ActionSpace, ConfigFile, FeaturesLabels, Labels, NetworkRoles,
    NeuralNet, StateActionReward, TrainingBatch, Q_VALUES,
};
use anyhow::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Configuration of [`NStepQLearning`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct NStepConfig {
    /// Discount factor.
    pub gamma: f32,
}

impl Default for NStepConfig {
    fn default() -> Self {
        Self { gamma: 0.99 }
    }
}

impl NStepConfig {
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

impl ConfigFile for NStepConfig {}

/// N-step Q-learning over a trajectory.
///
/// The return is bootstrapped from the target network at the batch's final
/// observation, or zero if the trajectory ended the episode, and accumulated backward
/// through the batch.
#[derive(Clone, Debug)]
pub struct NStepQLearning<S> {
    space: S,
    gamma: f32,
}

impl<S: ActionSpace> NStepQLearning<S> {
    /// Constructs the algorithm.
    pub fn build(space: S, config: &NStepConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            space,
            gamma: config.gamma,
        })
    }
}

impl<N, S> UpdateAlgorithm<N, StateActionReward<S::Action>> for NStepQLearning<S>
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
        let mut r = if last.is_terminal {
            0.0
        } else {
            let obs = batch
                .final_observation()
                .ok_or(TrainingError::MissingFinalObservation)?;
            nets.target_output(obs)?.max(Q_VALUES)?
        };

        let n_actions = self.space.size();
        let mut labels = Array2::<f32>::zeros((batch.len(), n_actions));
        for (i, t) in batch.iter().enumerate().rev() {
            let ix = self.space.action_index(&t.action)?;
            r = t.reward + if t.is_terminal { 0.0 } else { self.gamma * r };

            let mut row = nets.current().output(&t.obs)?.get(Q_VALUES)?.clone();
            check_len(Q_VALUES, &row, n_actions)?;
            row[ix] = r;
            labels.row_mut(i).assign(&row);
        }

        let mut l = Labels::new();
        l.insert(Q_VALUES, labels);
        Ok(FeaturesLabels::new(
            batch.iter().map(|t| t.obs.clone()).collect(),
            l,
        ))
    }
}
