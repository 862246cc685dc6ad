//! Replay memory.
use super::ExperienceHandler;
use crate::{
    config::ensure_config, ConfigFile, Observation, StateActionReward, StateActionRewardNext,
    TrainingBatch,
};
use anyhow::Result;
use rand::{rngs::StdRng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Configuration of [`ReplayMemoryHandler`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayMemoryConfig {
    /// Maximum number of stored transitions.
    pub capacity: usize,

    /// Number of transitions in a sampled batch.
    pub batch_size: usize,

    /// Seed of the sampler.
    pub seed: u64,
}

impl Default for ReplayMemoryConfig {
    fn default() -> Self {
        Self {
            capacity: 10000,
            batch_size: 32,
            seed: 42,
        }
    }
}

impl ReplayMemoryConfig {
    /// Sets the capacity.
    pub fn capacity(mut self, v: usize) -> Self {
        self.capacity = v;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Checks `1 <= batch_size <= capacity`.
    pub fn validate(&self) -> Result<()> {
        ensure_config(self.batch_size >= 1, "batch_size must be at least 1")?;
        ensure_config(
            self.batch_size <= self.capacity,
            format!(
                "batch_size ({}) must not exceed capacity ({})",
                self.batch_size, self.capacity
            ),
        )
    }
}

impl ConfigFile for ReplayMemoryConfig {}

/// A ring buffer of transitions paired with their successor observations.
///
/// A transition is stored once the observation that follows it is known, i.e. on the
/// next call of `add_experience` or on `set_final_observation`. Sampling does not
/// consume stored transitions.
pub struct ReplayMemoryHandler<A> {
    capacity: usize,
    batch_size: usize,

    /// Next insertion index.
    i: usize,

    /// Number of stored transitions.
    size: usize,
    storage: Vec<StateActionRewardNext<A>>,
    pending: Option<StateActionReward<A>>,
    rng: StdRng,
}

impl<A: Clone> ReplayMemoryHandler<A> {
    /// Constructs the handler.
    pub fn build(config: &ReplayMemoryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            capacity: config.capacity,
            batch_size: config.batch_size,
            i: 0,
            size: 0,
            storage: Vec::with_capacity(config.capacity),
            pending: None,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    fn push(&mut self, t: StateActionRewardNext<A>) {
        if self.storage.len() < self.capacity {
            self.storage.push(t);
        } else {
            self.storage[self.i] = t;
        }
        self.i = (self.i + 1) % self.capacity;
        self.size = (self.size + 1).min(self.capacity);
    }

    fn resolve_pending(&mut self, next_obs: &Observation) {
        if let Some(t) = self.pending.take() {
            self.push(t.with_next(next_obs.clone()));
        }
    }

    /// Returns `true` if a transition waits for its successor observation.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Draws distinct indices by rejection.
    fn sample_indices(&mut self) -> Vec<usize> {
        let mut seen = HashSet::with_capacity(self.batch_size);
        let mut ixs = Vec::with_capacity(self.batch_size);
        while ixs.len() < self.batch_size {
            let ix = (self.rng.next_u32() as usize) % self.size;
            if seen.insert(ix) {
                ixs.push(ix);
            }
        }
        ixs
    }
}

impl<A: Clone> ExperienceHandler<A> for ReplayMemoryHandler<A> {
    type Transition = StateActionRewardNext<A>;

    fn add_experience(&mut self, obs: &Observation, action: &A, reward: f32, is_terminal: bool) {
        self.resolve_pending(obs);
        self.pending = Some(StateActionReward::new(
            obs.clone(),
            action.clone(),
            reward,
            is_terminal,
        ));
    }

    fn amend_last_experience(&mut self, reward: f32, is_terminal: bool) {
        if let Some(t) = self.pending.as_mut() {
            t.reward += reward;
            t.is_terminal |= is_terminal;
        }
    }

    fn set_final_observation(&mut self, obs: &Observation) {
        self.resolve_pending(obs);
    }

    fn is_training_batch_ready(&self) -> bool {
        self.size >= self.batch_size
    }

    /// Samples a batch of distinct stored transitions.
    ///
    /// Returns an empty batch while fewer than `batch_size` transitions are stored.
    fn generate_training_batch(&mut self) -> TrainingBatch<Self::Transition> {
        if !self.is_training_batch_ready() {
            return TrainingBatch::empty();
        }
        let transitions = self
            .sample_indices()
            .into_iter()
            .map(|ix| self.storage[ix].clone())
            .collect();
        TrainingBatch::new(transitions, None)
    }

    /// Discards the pending transition. Stored transitions are kept.
    fn reset(&mut self) {
        self.pending = None;
    }

    fn len(&self) -> usize {
        self.size
    }
}
