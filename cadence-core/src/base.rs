//! Core functionalities.
mod action;
mod env;
mod network;
mod observation;
mod transition;
pub use action::{
    Action, ActionSpace, ContinuousAction, ContinuousActionSpace, DiscreteAction,
    DiscreteActionSpace,
};
pub use env::{Env, EnvAction, Step};
pub use network::{
    FeaturesLabels, Labels, NetOutputs, NetworkRoles, NeuralNet, POLICY, Q_VALUES, VALUE,
};
pub use observation::Observation;
pub use transition::{StateActionReward, StateActionRewardNext, TrainingBatch, Transition};
