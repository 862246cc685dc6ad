//! This module is used for tests.
use crate::{
    ActionSpace, DiscreteAction, DiscreteActionSpace, Env, FeaturesLabels, NetOutputs,
    NeuralNet, Observation, Step, POLICY, Q_VALUES, VALUE,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration of [`DummyEnv`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DummyEnvConfig {
    /// Number of steps until the episode terminates.
    pub steps_per_episode: usize,

    /// Number of actions.
    pub n_actions: usize,

    /// Reward of every step.
    pub reward: f32,

    /// Marks every `k`-th observation as skipped.
    pub skip_every: Option<usize>,

    /// An action that is never valid.
    pub invalid_action: Option<usize>,
}

impl Default for DummyEnvConfig {
    fn default() -> Self {
        Self {
            steps_per_episode: 10,
            n_actions: 2,
            reward: 1.0,
            skip_every: None,
            invalid_action: None,
        }
    }
}

impl DummyEnvConfig {
    /// Sets the episode length.
    pub fn steps_per_episode(mut self, v: usize) -> Self {
        self.steps_per_episode = v;
        self
    }

    /// Sets the number of actions.
    pub fn n_actions(mut self, v: usize) -> Self {
        self.n_actions = v;
        self
    }

    /// Sets the reward.
    pub fn reward(mut self, v: f32) -> Self {
        self.reward = v;
        self
    }

    /// Sets the skip interval.
    pub fn skip_every(mut self, v: Option<usize>) -> Self {
        self.skip_every = v;
        self
    }

    /// Sets the invalid action.
    pub fn invalid_action(mut self, v: Option<usize>) -> Self {
        self.invalid_action = v;
        self
    }
}

/// An environment whose observation is the step count of the episode.
pub struct DummyEnv {
    config: DummyEnvConfig,
    space: DiscreteActionSpace,
    seed: i64,
    t: usize,
    finished: bool,
    n_resets: usize,
    actions: Vec<usize>,
}

impl DummyEnv {
    /// Number of episodes started.
    pub fn n_resets(&self) -> usize {
        self.n_resets
    }

    /// Seed the environment was built with.
    pub fn seed(&self) -> i64 {
        self.seed
    }

    /// Actions received since construction.
    pub fn actions(&self) -> &[usize] {
        &self.actions
    }

    fn obs(&self) -> Observation {
        Observation::from_vec("state", vec![self.t as f32])
    }
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;
    type Space = DiscreteActionSpace;

    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            space: DiscreteActionSpace::new(config.n_actions),
            seed,
            t: 0,
            finished: false,
            n_resets: 0,
            actions: vec![],
        })
    }

    fn reset(&mut self) -> Result<Observation> {
        self.t = 0;
        self.finished = false;
        self.n_resets += 1;
        Ok(self.obs())
    }

    fn step(&mut self, action: &DiscreteAction) -> Result<Step> {
        self.space.action_index(action)?;
        self.actions.push(action.0);
        self.t += 1;
        self.finished = self.t >= self.config.steps_per_episode;
        let skipped = match self.config.skip_every {
            Some(k) => !self.finished && self.t % k == 0,
            None => false,
        };
        let obs = if skipped {
            Observation::skipped(self.obs().channels().to_vec())
        } else {
            self.obs()
        };
        Ok(Step::new(obs, self.config.reward, self.finished))
    }

    fn action_space(&self) -> &DiscreteActionSpace {
        &self.space
    }

    fn is_episode_finished(&self) -> bool {
        self.finished
    }

    fn is_valid_action(&self, action: &DiscreteAction) -> bool {
        self.config.invalid_action != Some(action.0)
    }

    fn has_action_constraints(&self) -> bool {
        self.config.invalid_action.is_some()
    }
}

/// A network with fixed outputs shifted by a trainable bias.
///
/// Fitting adds one to the bias; gradients are a bias increment of one.
/// The bias is not added to the `Policy` output.
#[derive(Clone, Debug)]
pub struct DummyNet {
    outputs: NetOutputs,
    bias: f32,
    n_fits: usize,
    n_gradient_applications: usize,
    last_fit: Option<FeaturesLabels>,
    recurrent: bool,
    n_resets: usize,
}

impl DummyNet {
    /// Constructs a network from outputs.
    pub fn new(outputs: NetOutputs) -> Self {
        Self {
            outputs,
            bias: 0.0,
            n_fits: 0,
            n_gradient_applications: 0,
            last_fit: None,
            recurrent: false,
            n_resets: 0,
        }
    }

    /// A network with a `QValues` output.
    pub fn with_q_values(q: Vec<f32>) -> Self {
        Self::new(NetOutputs::new().with(Q_VALUES, q))
    }

    /// A network with `Value` and `Policy` outputs.
    pub fn with_actor_critic(value: f32, policy: Vec<f32>) -> Self {
        Self::new(
            NetOutputs::new()
                .with(VALUE, vec![value])
                .with(POLICY, policy),
        )
    }

    /// Makes the network report itself as recurrent.
    pub fn recurrent(mut self, v: bool) -> Self {
        self.recurrent = v;
        self
    }

    /// Sets the bias.
    pub fn set_bias(&mut self, bias: f32) {
        self.bias = bias;
    }

    /// The bias.
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Number of calls of [`NeuralNet::fit`].
    pub fn n_fits(&self) -> usize {
        self.n_fits
    }

    /// Number of calls of [`NeuralNet::apply_gradients`].
    pub fn n_gradient_applications(&self) -> usize {
        self.n_gradient_applications
    }

    /// Labels of the latest fit.
    pub fn last_fit(&self) -> Option<&FeaturesLabels> {
        self.last_fit.as_ref()
    }

    /// Number of calls of [`NeuralNet::reset`].
    pub fn n_resets(&self) -> usize {
        self.n_resets
    }
}

impl NeuralNet for DummyNet {
    type Gradients = f32;

    fn output(&self, _obs: &Observation) -> Result<NetOutputs> {
        let mut out = NetOutputs::new();
        for (name, v) in self.outputs.iter() {
            if name == POLICY {
                out.insert(name.clone(), v.clone());
            } else {
                out.insert(name.clone(), v + self.bias);
            }
        }
        Ok(out)
    }

    fn fit(&mut self, fl: &FeaturesLabels) -> Result<()> {
        self.bias += 1.0;
        self.n_fits += 1;
        self.last_fit = Some(fl.clone());
        Ok(())
    }

    fn compute_gradients(&mut self, fl: &FeaturesLabels) -> Result<f32> {
        self.last_fit = Some(fl.clone());
        Ok(1.0)
    }

    fn apply_gradients(&mut self, gradients: &f32, _batch_size: usize) -> Result<()> {
        self.bias += gradients;
        self.n_gradient_applications += 1;
        Ok(())
    }

    fn copy_from(&mut self, other: &Self) {
        self.outputs = other.outputs.clone();
        self.bias = other.bias;
    }

    fn reset(&mut self) {
        self.n_resets += 1;
    }

    fn is_recurrent(&self) -> bool {
        self.recurrent
    }
}
