//! Environment.
use super::{ActionSpace, Observation};
use anyhow::Result;

/// Outcome of a single environment step.
#[derive(Clone, Debug)]
pub struct Step {
    /// Observation after the step.
    pub obs: Observation,

    /// Reward of the step.
    pub reward: f32,

    /// Flag denoting the episode has ended.
    pub is_terminal: bool,
}

impl Step {
    /// Constructs a [`Step`] object.
    pub fn new(obs: Observation, reward: f32, is_terminal: bool) -> Self {
        Self {
            obs,
            reward,
            is_terminal,
        }
    }
}

/// Action type of an environment.
pub type EnvAction<E> = <<E as Env>::Space as ActionSpace>::Action;

/// Represents an environment, typically an MDP.
///
/// Concrete environments live outside of this crate.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Action space.
    type Space: ActionSpace;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the first observation of an episode.
    fn reset(&mut self) -> Result<Observation>;

    /// Performs an environment step.
    fn step(&mut self, action: &EnvAction<Self>) -> Result<Step>;

    /// Action space of the environment.
    fn action_space(&self) -> &Self::Space;

    /// Returns `true` if the current episode has ended.
    fn is_episode_finished(&self) -> bool;

    /// Returns `true` if `action` can be taken in the current state.
    fn is_valid_action(&self, _action: &EnvAction<Self>) -> bool {
        true
    }

    /// Returns `true` if [`Env::is_valid_action`] constrains actions.
    ///
    /// Agents ask policies for a legal action only when this returns `true`.
    fn has_action_constraints(&self) -> bool {
        false
    }
}
