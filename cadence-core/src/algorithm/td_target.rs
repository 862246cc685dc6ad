//! One-step temporal-difference targets.
use super::{validate_gamma, UpdateAlgorithm};
use crate::{
    config::ensure_config, error::TrainingError, ActionSpace, ConfigFile, FeaturesLabels,
    Labels, NetworkRoles, NeuralNet, StateActionRewardNext, TrainingBatch, Q_VALUES,
};
use anyhow::Result;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Configuration of [`TdTarget`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TdTargetConfig {
    /// Discount factor.
    pub gamma: f32,

    /// Selects the bootstrap action with the current network (double DQN).
    pub double_dqn: bool,

    /// Limits the distance between target and prediction.
    pub error_clamp: Option<f32>,
}

impl Default for TdTargetConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            double_dqn: false,
            error_clamp: None,
        }
    }
}

impl TdTargetConfig {
    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Enables or disables double DQN.
    pub fn double_dqn(mut self, v: bool) -> Self {
        self.double_dqn = v;
        self
    }

    /// Sets the clamp distance.
    pub fn error_clamp(mut self, v: Option<f32>) -> Self {
        self.error_clamp = v;
        self
    }

    /// Checks the discount factor and the clamp distance.
    pub fn validate(&self) -> Result<()> {
        validate_gamma(self.gamma)?;
        if let Some(delta) = self.error_clamp {
            ensure_config(
                delta > 0.0,
                format!("error_clamp must be positive, got {}", delta),
            )?;
        }
        Ok(())
    }
}

impl ConfigFile for TdTargetConfig {}

/// One-step TD target `r + gamma * max_a Q_target(s', a)`.
///
/// With `double_dqn` the bootstrap action is the arg-max of the current network and
/// its value is read from the target network. The label row of a transition is the
/// current prediction with the entry of the taken action replaced by the target.
#[derive(Clone, Debug)]
pub struct TdTarget<S> {
    space: S,
    gamma: f32,
    double_dqn: bool,
    error_clamp: Option<f32>,
}

impl<S: ActionSpace> TdTarget<S> {
    /// Constructs the algorithm.
    pub fn build(space: S, config: &TdTargetConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            space,
            gamma: config.gamma,
            double_dqn: config.double_dqn,
            error_clamp: config.error_clamp,
        })
    }

    fn clamp(&self, target: f32, pred: f32) -> f32 {
        match self.error_clamp {
            Some(delta) if target > pred + delta => pred + delta,
            Some(delta) if target < pred - delta => pred - delta,
            _ => target,
        }
    }
}

pub(super) fn check_len(name: &str, values: &Array1<f32>, expected: usize) -> Result<()> {
    if values.len() != expected {
        return Err(TrainingError::OutputShape {
            name: name.to_string(),
            expected,
            actual: values.len(),
        }
        .into());
    }
    Ok(())
}

impl<N, S> UpdateAlgorithm<N, StateActionRewardNext<S::Action>> for TdTarget<S>
where
    N: NeuralNet,
    S: ActionSpace,
{
    fn compute(
        &self,
        nets: &dyn NetworkRoles<N>,
        batch: &TrainingBatch<StateActionRewardNext<S::Action>>,
    ) -> Result<FeaturesLabels> {
        if batch.is_empty() {
            return Err(TrainingError::EmptyBatch.into());
        }
        let n = batch.len();
        let n_actions = self.space.size();
        let mut labels = Array2::<f32>::zeros((n, n_actions));

        for (i, t) in batch.iter().enumerate().rev() {
            let ix = self.space.action_index(&t.action)?;
            let pred = nets.current().output(&t.obs)?.get(Q_VALUES)?.clone();
            check_len(Q_VALUES, &pred, n_actions)?;

            let target = if t.is_terminal {
                t.reward
            } else {
                let next = nets.target_output(&t.next_obs)?;
                let bootstrap = if self.double_dqn {
                    let a = nets.current().output(&t.next_obs)?.argmax(Q_VALUES)?;
                    let q = next.get(Q_VALUES)?;
                    check_len(Q_VALUES, q, n_actions)?;
                    q[a]
                } else {
                    next.max(Q_VALUES)?
                };
                t.reward + self.gamma * bootstrap
            };

            let mut row = pred.clone();
            row[ix] = self.clamp(target, pred[ix]);
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
