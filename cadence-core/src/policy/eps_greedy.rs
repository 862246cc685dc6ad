//! Epsilon-greedy exploration.
use super::Policy;
use crate::{config::ensure_config, ActionSpace, ConfigFile, Observation};
use anyhow::Result;
use fastrand::Rng;
use serde::{Deserialize, Serialize};

/// Configuration of [`EpsGreedy`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsGreedyConfig {
    /// Epsilon before annealing starts.
    pub eps_start: f64,

    /// Epsilon after annealing.
    pub eps_min: f64,

    /// Number of calls over which epsilon decreases linearly.
    pub anneal_steps: usize,

    /// Number of calls before annealing starts.
    pub anneal_start: usize,

    /// Seed of the random number generator.
    pub seed: u64,
}

impl Default for EpsGreedyConfig {
    fn default() -> Self {
        Self {
            eps_start: 1.0,
            eps_min: 0.1,
            anneal_steps: 1_000_000,
            anneal_start: 0,
            seed: 42,
        }
    }
}

impl EpsGreedyConfig {
    /// Sets the initial epsilon.
    pub fn eps_start(mut self, v: f64) -> Self {
        self.eps_start = v;
        self
    }

    /// Sets the final epsilon.
    pub fn eps_min(mut self, v: f64) -> Self {
        self.eps_min = v;
        self
    }

    /// Sets the length of the annealing period.
    pub fn anneal_steps(mut self, v: usize) -> Self {
        self.anneal_steps = v;
        self
    }

    /// Sets the number of calls before annealing.
    pub fn anneal_start(mut self, v: usize) -> Self {
        self.anneal_start = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Checks `0 <= eps_min <= eps_start <= 1` and a non-empty annealing period.
    pub fn validate(&self) -> Result<()> {
        ensure_config(
            0.0 <= self.eps_min && self.eps_min <= self.eps_start && self.eps_start <= 1.0,
            format!(
                "epsilon must satisfy 0 <= eps_min <= eps_start <= 1, \
                 got eps_min = {}, eps_start = {}",
                self.eps_min, self.eps_start
            ),
        )?;
        ensure_config(self.anneal_steps >= 1, "anneal_steps must be at least 1")
    }
}

impl ConfigFile for EpsGreedyConfig {}

/// Wraps a policy and takes a random action with probability epsilon.
///
/// Epsilon is annealed linearly by an internal call counter, so each agent keeps its
/// own schedule.
#[derive(Clone, Debug)]
pub struct EpsGreedy<P, S> {
    inner: P,
    space: S,
    rng: Rng,
    eps_start: f64,
    eps_min: f64,
    anneal_steps: usize,
    anneal_start: usize,
    n_calls: usize,
}

impl<P, S: ActionSpace> EpsGreedy<P, S> {
    /// Constructs the policy.
    pub fn build(inner: P, space: S, config: &EpsGreedyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            inner,
            space,
            rng: Rng::with_seed(config.seed),
            eps_start: config.eps_start,
            eps_min: config.eps_min,
            anneal_steps: config.anneal_steps,
            anneal_start: config.anneal_start,
            n_calls: 0,
        })
    }

    /// Epsilon at the `k`-th call.
    pub fn epsilon_at(&self, k: usize) -> f64 {
        if k <= self.anneal_start {
            return self.eps_start;
        }
        let frac = ((k - self.anneal_start) as f64 / self.anneal_steps as f64).min(1.0);
        (self.eps_start - (self.eps_start - self.eps_min) * frac).max(self.eps_min)
    }

    /// Epsilon used by the next call.
    pub fn epsilon(&self) -> f64 {
        self.epsilon_at(self.n_calls)
    }

    /// Number of actions selected so far.
    pub fn n_calls(&self) -> usize {
        self.n_calls
    }

    /// The wrapped policy.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn explore(&mut self) -> bool {
        let eps = self.epsilon();
        self.n_calls += 1;
        self.rng.f64() < eps
    }
}

impl<N, P, S> Policy<N, S::Action> for EpsGreedy<P, S>
where
    P: Policy<N, S::Action>,
    S: ActionSpace,
{
    fn next_action(&mut self, net: &N, obs: &Observation) -> Result<S::Action> {
        if self.explore() {
            Ok(self.space.random_action(&mut self.rng))
        } else {
            self.inner.next_action(net, obs)
        }
    }

    fn next_legal_action(
        &mut self,
        net: &N,
        obs: &Observation,
        is_legal: &dyn Fn(&S::Action) -> bool,
    ) -> Result<S::Action> {
        if self.explore() {
            self.space.random_valid_action(&mut self.rng, is_legal)
        } else {
            self.inner.next_legal_action(net, obs, is_legal)
        }
    }
}
