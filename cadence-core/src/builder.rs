//! Ready-made agent builder for one-step Q-learning with replay.
use crate::{
    algorithm::{TdTarget, TdTargetConfig},
    experience::{ReplayMemoryConfig, ReplayMemoryHandler},
    policy::{EpsGreedy, EpsGreedyConfig, GreedyPolicy},
    updater::{SyncLabelsUpdater, SyncUpdaterConfig},
    AgentBuilder, ConfigFile, Env, EnvAction, LearningAgent, LearningAgentConfig, NeuralNet,
    StdLearningBehavior,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration of [`DqnAgentBuilder`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnConfig {
    /// TD target.
    pub td_target: TdTargetConfig,

    /// Replay memory.
    pub replay: ReplayMemoryConfig,

    /// Updater.
    pub updater: SyncUpdaterConfig,

    /// Exploration.
    pub eps_greedy: EpsGreedyConfig,

    /// Agent.
    pub agent: LearningAgentConfig,

    /// Seed of the environment of worker `0`. Worker `i` uses `env_seed + i`.
    pub env_seed: i64,
}

impl Default for DqnConfig {
    fn default() -> Self {
        Self {
            td_target: TdTargetConfig::default(),
            replay: ReplayMemoryConfig::default(),
            updater: SyncUpdaterConfig::default(),
            eps_greedy: EpsGreedyConfig::default(),
            agent: LearningAgentConfig::default(),
            env_seed: 0,
        }
    }
}

impl DqnConfig {
    /// Checks every part of the configuration.
    pub fn validate(&self) -> Result<()> {
        self.td_target.validate()?;
        self.replay.validate()?;
        self.updater.validate()?;
        self.eps_greedy.validate()?;
        self.agent.validate()
    }
}

impl ConfigFile for DqnConfig {}

/// Agent built by [`DqnAgentBuilder`].
pub type DqnAgent<E, N> = LearningAgent<
    E,
    N,
    EpsGreedy<GreedyPolicy<<E as Env>::Space>, <E as Env>::Space>,
    StdLearningBehavior<
        EnvAction<E>,
        N,
        ReplayMemoryHandler<EnvAction<E>>,
        TdTarget<<E as Env>::Space>,
        SyncLabelsUpdater<N>,
    >,
>;

/// Builds agents learning with replay memory, TD targets and a synchronous updater.
///
/// Every build clones the network, so each agent starts from the same parameters.
pub struct DqnAgentBuilder<E: Env, N> {
    env_config: E::Config,
    network: N,
    config: DqnConfig,
}

impl<E: Env, N: NeuralNet> DqnAgentBuilder<E, N> {
    /// Constructs the builder.
    pub fn new(env_config: E::Config, network: N, config: DqnConfig) -> Self {
        Self {
            env_config,
            network,
            config,
        }
    }
}

impl<E: Env, N: NeuralNet> AgentBuilder for DqnAgentBuilder<E, N> {
    type Agent = DqnAgent<E, N>;

    fn validate(&self) -> Result<()> {
        self.config.validate()
    }

    fn build(&self, worker_id: usize) -> Result<Self::Agent> {
        let env = E::build(&self.env_config, self.config.env_seed + worker_id as i64)?;
        let space = env.action_space().clone();

        let replay = &self.config.replay;
        let handler =
            ReplayMemoryHandler::build(&replay.clone().seed(replay.seed + worker_id as u64))?;
        let algorithm = TdTarget::build(space.clone(), &self.config.td_target)?;
        let updater = SyncLabelsUpdater::build(self.network.clone(), &self.config.updater)?;

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
