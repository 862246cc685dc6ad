//! Experience handlers buffering transitions until a training batch is ready.
//!
//! Two handlers are provided:
//!
//! * [`TrajectoryHandler`] keeps the most recent on-policy transitions and hands them
//!   out once. It serves n-step and actor-critic algorithms.
//! * [`ReplayMemoryHandler`] keeps a bounded history of transitions paired with their
//!   successor observations and samples batches from it without consuming them.
mod replay_memory;
mod trajectory;
use crate::{Observation, TrainingBatch};
pub use replay_memory::{ReplayMemoryConfig, ReplayMemoryHandler};
pub use trajectory::{TrajectoryConfig, TrajectoryHandler};

/// Buffers experience of a learning agent.
pub trait ExperienceHandler<A> {
    /// Type of the stored transitions.
    type Transition: Clone;

    /// Records that `action` was taken at `obs`, yielding `reward`.
    fn add_experience(&mut self, obs: &Observation, action: &A, reward: f32, is_terminal: bool);

    /// Adds `reward` to the most recently added transition and marks it terminal if
    /// `is_terminal` holds.
    ///
    /// Does nothing if that transition has already been stored.
    fn amend_last_experience(&mut self, reward: f32, is_terminal: bool);

    /// Records the observation that ended the episode.
    fn set_final_observation(&mut self, obs: &Observation);

    /// Returns `true` if [`ExperienceHandler::generate_training_batch`] would yield a
    /// useful batch.
    fn is_training_batch_ready(&self) -> bool;

    /// Returns a training batch.
    fn generate_training_batch(&mut self) -> TrainingBatch<Self::Transition>;

    /// Discards episode-local state.
    fn reset(&mut self);

    /// Number of stored transitions.
    fn len(&self) -> usize;

    /// Returns `true` if no transition is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
