#![warn(missing_docs)]
//! Asynchronous trainer running several learning agents on threads.
//!
//! Workers own an environment and an agent each. Their agents compute gradients on a
//! local copy of the network and apply them to a global network held in
//! [`SharedNetworks`], then copy the global parameters back at synchronization points.
//!
//! # Messages
//! * From workers to [`AsyncTrainer`]
//!   - [`WorkerMessage`]: finished episodes and the outcome of each worker.
mod async_trainer;
mod async_updater;
mod builders;
mod messages;
mod shared_networks;
mod worker;
pub use async_trainer::{AsyncTrainStat, AsyncTrainer, AsyncTrainerConfig};
pub use async_updater::AsyncGradientsUpdater;
pub use builders::{
    A2cAgent, A2cAgentBuilder, A2cAgentConfig, NStepQAgent, NStepQAgentBuilder, NStepQAgentConfig,
};
pub use messages::WorkerMessage;
pub use shared_networks::{SharedNetworks, SharedNetworksConfig};
pub use worker::{worker_stats_fmt, WorkerStat};
