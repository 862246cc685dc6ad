#![warn(missing_docs)]
//! Core of cadence, a training-orchestration library for reinforcement learning.
//!
//! The crate turns interaction with an environment ([`Env`]) into buffered experience
//! ([`experience`]), derives training labels from that experience ([`algorithm`]) and
//! applies them to the networks owned by an updater ([`updater`]).
//! A [`LearningAgent`] plays episodes and a [`SyncTrainer`] drives the agent until a
//! stopping condition holds. The multi-threaded counterpart lives in
//! `cadence-async-trainer`.
//!
//! The network itself and the environments are external collaborators, represented by
//! the [`NeuralNet`] and [`Env`] traits.
pub mod algorithm;
pub mod dummy;
pub mod error;
pub mod experience;
pub mod policy;
pub mod record;
pub mod updater;

mod agent;
mod base;
mod behavior;
mod builder;
mod config;
mod listener;
mod trainer;

pub use agent::{AgentLearner, EpisodeStat, LearningAgent, LearningAgentConfig};
pub use base::{
    Action, ActionSpace, ContinuousAction, ContinuousActionSpace, DiscreteAction,
    DiscreteActionSpace, Env, EnvAction, FeaturesLabels, Labels, NetOutputs, NetworkRoles,
    NeuralNet, Observation, StateActionReward, StateActionRewardNext, Step, TrainingBatch,
    Transition, POLICY, Q_VALUES, VALUE,
};
pub use behavior::{BehaviorState, LearningBehavior, StdLearningBehavior, UpdateRule};
pub use builder::{DqnAgent, DqnAgentBuilder, DqnConfig};
pub use config::{ensure_config, ConfigFile};
pub use listener::{AgentListener, ListenerResponse};
pub use trainer::{AgentBuilder, SyncTrainer, SyncTrainerConfig, TrainingProgress};
