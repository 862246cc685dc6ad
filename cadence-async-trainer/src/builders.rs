//! Agent builders for asynchronous n-step Q-learning and advantage actor-critic.
use crate::{AsyncGradientsUpdater, SharedNetworks};
use anyhow::Result;
use cadence_core::{
    algorithm::{ActorCriticConfig, AdvantageActorCritic, NStepConfig, NStepQLearning},
    experience::{TrajectoryConfig, TrajectoryHandler},
    policy::{EpsGreedy, EpsGreedyConfig, GreedyPolicy, StochasticPolicy},
    AgentBuilder, ConfigFile, Env, EnvAction, LearningAgent, LearningAgentConfig, NeuralNet,
    StdLearningBehavior,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration of [`NStepQAgentBuilder`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct NStepQAgentConfig {
    /// Discount factor.
    pub nstep: NStepConfig,

    /// Length of trajectories.
    pub trajectory: TrajectoryConfig,

    /// Exploration.
    pub eps_greedy: EpsGreedyConfig,

    /// Agent.
    pub agent: LearningAgentConfig,

    /// Seed of the environment of worker `0`. Worker `i` uses `env_seed + i`.
    pub env_seed: i64,
}

impl Default for NStepQAgentConfig {
    fn default() -> Self {
        Self {
            nstep: NStepConfig::default(),
            trajectory: TrajectoryConfig::default(),
            eps_greedy: EpsGreedyConfig::default(),
            agent: LearningAgentConfig::default(),
            env_seed: 0,
        }
    }
}

impl NStepQAgentConfig {
    /// Checks every part of the configuration.
    pub fn validate(&self) -> Result<()> {
        self.nstep.validate()?;
        self.trajectory.validate()?;
        self.eps_greedy.validate()?;
        self.agent.validate()
    }
}

impl ConfigFile for NStepQAgentConfig {}

/// Agent built by [`NStepQAgentBuilder`].
pub type NStepQAgent<E, N> = LearningAgent<
    E,
    N,
    EpsGreedy<GreedyPolicy<<E as Env>::Space>, <E as Env>::Space>,
    StdLearningBehavior<
        EnvAction<E>,
        N,
        TrajectoryHandler<EnvAction<E>>,
        NStepQLearning<<E as Env>::Space>,
        AsyncGradientsUpdater<N>,
    >,
>;

/// Builds n-step Q-learning agents sharing one global network.
pub struct NStepQAgentBuilder<E: Env, N> {
    env_config: E::Config,
    shared: Arc<SharedNetworks<N>>,
    config: NStepQAgentConfig,
}

impl<E: Env, N: NeuralNet> NStepQAgentBuilder<E, N> {
    /// Constructs the builder.
    pub fn new(
        env_config: E::Config,
        shared: Arc<SharedNetworks<N>>,
        config: NStepQAgentConfig,
    ) -> Self {
        Self {
            env_config,
            shared,
            config,
        }
    }

    /// The shared networks.
    pub fn shared(&self) -> &Arc<SharedNetworks<N>> {
        &self.shared
    }
}

impl<E: Env, N: NeuralNet> AgentBuilder for NStepQAgentBuilder<E, N> {
    type Agent = NStepQAgent<E, N>;

    fn validate(&self) -> Result<()> {
        self.config.validate()
    }

    fn build(&self, worker_id: usize) -> Result<Self::Agent> {
        let env = E::build(&self.env_config, self.config.env_seed + worker_id as i64)?;
        let space = env.action_space().clone();

        let handler = TrajectoryHandler::build(&self.config.trajectory)?;
        let algorithm = NStepQLearning::build(space.clone(), &self.config.nstep)?;
        let updater = AsyncGradientsUpdater::build(self.shared.clone())?;

        let eps = &self.config.eps_greedy;
        let policy = EpsGreedy::build(
            GreedyPolicy::new(space.clone()),
            space,
            &eps.clone().seed(eps.seed + worker_id as u64),
        )?;

        LearningAgent::build(
            env,
            policy,
            StdLearningBehavior::new(handler, algorithm, updater),
            &self.config.agent,
        )
    }
}

/// Configuration of [`A2cAgentBuilder`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct A2cAgentConfig {
    /// Discount factor.
    pub actor_critic: ActorCriticConfig,

    /// Length of trajectories.
    pub trajectory: TrajectoryConfig,

    /// Agent.
    pub agent: LearningAgentConfig,

    /// Seed of the policy of worker `0`. Worker `i` uses `policy_seed + i`.
    pub policy_seed: u64,

    /// Seed of the environment of worker `0`. Worker `i` uses `env_seed + i`.
    pub env_seed: i64,
}

impl Default for A2cAgentConfig {
    fn default() -> Self {
        Self {
            actor_critic: ActorCriticConfig::default(),
            trajectory: TrajectoryConfig::default(),
            agent: LearningAgentConfig::default(),
            policy_seed: 42,
            env_seed: 0,
        }
    }
}

impl A2cAgentConfig {
    /// Checks every part of the configuration.
    pub fn validate(&self) -> Result<()> {
        self.actor_critic.validate()?;
        self.trajectory.validate()?;
        self.agent.validate()
    }
}

impl ConfigFile for A2cAgentConfig {}

/// Agent built by [`A2cAgentBuilder`].
pub type A2cAgent<E, N> = LearningAgent<
    E,
    N,
    StochasticPolicy<<E as Env>::Space>,
    StdLearningBehavior<
        EnvAction<E>,
        N,
        TrajectoryHandler<EnvAction<E>>,
        AdvantageActorCritic<<E as Env>::Space>,
        AsyncGradientsUpdater<N>,
    >,
>;

/// Builds advantage actor-critic agents sharing one global network.
pub struct A2cAgentBuilder<E: Env, N> {
    env_config: E::Config,
    shared: Arc<SharedNetworks<N>>,
    config: A2cAgentConfig,
}

impl<E: Env, N: NeuralNet> A2cAgentBuilder<E, N> {
    /// Constructs the builder.
    pub fn new(
        env_config: E::Config,
        shared: Arc<SharedNetworks<N>>,
        config: A2cAgentConfig,
    ) -> Self {
        Self {
            env_config,
            shared,
            config,
        }
    }

    /// The shared networks.
    pub fn shared(&self) -> &Arc<SharedNetworks<N>> {
        &self.shared
    }
}

impl<E: Env, N: NeuralNet> AgentBuilder for A2cAgentBuilder<E, N> {
    type Agent = A2cAgent<E, N>;

    fn validate(&self) -> Result<()> {
        self.config.validate()
    }

    fn build(&self, worker_id: usize) -> Result<Self::Agent> {
        let env = E::build(&self.env_config, self.config.env_seed + worker_id as i64)?;
        let space = env.action_space().clone();

        let handler = TrajectoryHandler::build(&self.config.trajectory)?;
        let algorithm = AdvantageActorCritic::build(space.clone(), &self.config.actor_critic)?;
        let updater = AsyncGradientsUpdater::build(self.shared.clone())?;
        let policy = StochasticPolicy::new(space, self.config.policy_seed + worker_id as u64);

        LearningAgent::build(
            env,
            policy,
            StdLearningBehavior::new(handler, algorithm, updater),
            &self.config.agent,
        )
    }
}
