//! Learning agent playing episodes.
use crate::{
    config::ensure_config,
    listener::{notify, AgentListener, ListenerResponse},
    policy::Policy,
    record::{Record, RecordValue},
    ActionSpace, ConfigFile, Env, EnvAction, LearningBehavior, Observation,
};
use anyhow::Result;
use chrono::Local;
use log::trace;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Summary of an episode.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EpisodeStat {
    /// Number of environment steps.
    pub steps: usize,

    /// Sum of rewards.
    pub reward: f32,

    /// A listener asked to stop training.
    pub stop_requested: bool,
}

impl EpisodeStat {
    /// Converts the summary into the record trainers write for each episode.
    pub fn to_record(&self, worker_id: usize, episode: usize) -> Record {
        Record::from_slice(&[
            ("episode", RecordValue::Scalar(episode as f32)),
            ("episode_steps", RecordValue::Scalar(self.steps as f32)),
            ("episode_reward", RecordValue::Scalar(self.reward)),
            ("worker", RecordValue::Scalar(worker_id as f32)),
            ("time", RecordValue::DateTime(Local::now())),
        ])
    }
}

/// Something that learns by playing episodes.
pub trait AgentLearner {
    /// Plays one episode.
    fn run(&mut self) -> Result<EpisodeStat>;
}

/// Configuration of [`LearningAgent`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct LearningAgentConfig {
    /// Maximum number of steps per episode.
    pub max_episode_steps: Option<usize>,
}

impl LearningAgentConfig {
    /// Sets the episode step cap.
    pub fn max_episode_steps(mut self, v: Option<usize>) -> Self {
        self.max_episode_steps = v;
        self
    }

    /// Checks the step cap is positive if given.
    pub fn validate(&self) -> Result<()> {
        ensure_config(
            self.max_episode_steps != Some(0),
            "max_episode_steps must be at least 1",
        )
    }
}

impl ConfigFile for LearningAgentConfig {}

/// Plays episodes in an environment and feeds the experience to a learning behavior.
///
/// In each step the agent selects an action with its policy and the behavior's
/// network, steps the environment and records the transition. Rewards are passed to
/// the behavior as the sum accrued since the previous recorded transition, so rewards
/// of skipped frames are credited to the next recorded one. Skipped observations
/// repeat the previous action, or the no-op action at the start of an episode, and
/// are never recorded. Rewards and termination that follow the last recorded
/// transition are folded into it at the end of the episode.
pub struct LearningAgent<E, N, P, B>
where
    E: Env,
{
    env: E,
    policy: P,
    behavior: B,
    max_episode_steps: Option<usize>,
    listeners: Vec<Box<dyn AgentListener<EnvAction<E>>>>,
    last_action: Option<EnvAction<E>>,
    phantom: PhantomData<N>,
}

impl<E, N, P, B> LearningAgent<E, N, P, B>
where
    E: Env,
    P: Policy<N, EnvAction<E>>,
    B: LearningBehavior<EnvAction<E>, N>,
{
    /// Constructs the agent.
    pub fn build(env: E, policy: P, behavior: B, config: &LearningAgentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            env,
            policy,
            behavior,
            max_episode_steps: config.max_episode_steps,
            listeners: vec![],
            last_action: None,
            phantom: PhantomData,
        })
    }

    /// Adds a listener.
    pub fn with_listener(mut self, listener: Box<dyn AgentListener<EnvAction<E>>>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// The environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// The policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// The learning behavior.
    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    fn select_action(&mut self, obs: &Observation) -> Result<EnvAction<E>> {
        if obs.is_skipped() {
            return Ok(match &self.last_action {
                Some(a) => a.clone(),
                None => self.env.action_space().noop(),
            });
        }
        let net = self.behavior.network();
        if self.env.has_action_constraints() {
            let env = &self.env;
            let is_legal = |a: &EnvAction<E>| env.is_valid_action(a);
            self.policy.next_legal_action(net, obs, &is_legal)
        } else {
            self.policy.next_action(net, obs)
        }
    }
}

impl<E, N, P, B> AgentLearner for LearningAgent<E, N, P, B>
where
    E: Env,
    P: Policy<N, EnvAction<E>>,
    B: LearningBehavior<EnvAction<E>, N>,
{
    fn run(&mut self) -> Result<EpisodeStat> {
        let mut stat = EpisodeStat::default();
        self.last_action = None;
        if notify(&mut self.listeners, |l| l.on_before_episode())? == ListenerResponse::Stop {
            stat.stop_requested = true;
            return Ok(stat);
        }

        self.behavior.handle_episode_start();
        let mut obs = self.env.reset()?;
        let mut recorded_reward = 0f32;
        let mut ended_unrecorded = false;

        loop {
            self.behavior.notify_before_step()?;
            let before = notify(&mut self.listeners, |l| l.on_before_step(&obs))?;
            if before == ListenerResponse::Stop {
                stat.stop_requested = true;
                break;
            }

            let action = self.select_action(&obs)?;
            let step = self.env.step(&action)?;
            stat.steps += 1;
            stat.reward += step.reward;
            trace!(
                "step {}: action = {:?}, reward = {}, terminal = {}",
                stat.steps,
                action,
                step.reward,
                step.is_terminal
            );

            let after = notify(&mut self.listeners, |l| l.on_after_step(&action, &step))?;

            if obs.is_skipped() {
                ended_unrecorded = step.is_terminal;
            } else {
                let delta = stat.reward - recorded_reward;
                recorded_reward = stat.reward;
                self.behavior
                    .handle_new_experience(&obs, &action, delta, step.is_terminal)?;
            }
            self.last_action = Some(action);
            obs = step.obs;

            if after == ListenerResponse::Stop {
                stat.stop_requested = true;
                break;
            }
            let capped = self.max_episode_steps.map_or(false, |m| stat.steps >= m);
            if step.is_terminal || self.env.is_episode_finished() || capped {
                break;
            }
        }

        let trailing = stat.reward - recorded_reward;
        if trailing != 0.0 || ended_unrecorded {
            self.behavior.handle_trailing_reward(trailing, ended_unrecorded)?;
        }
        self.behavior.handle_episode_end(&obs)?;

        if notify(&mut self.listeners, |l| l.on_after_episode(&stat))? == ListenerResponse::Stop {
            stat.stop_requested = true;
        }
        Ok(stat)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        algorithm::{NStepConfig, NStepQLearning},
        dummy::{DummyEnv, DummyEnvConfig, DummyNet},
        experience::{ExperienceHandler, TrajectoryConfig, TrajectoryHandler},
        policy::GreedyPolicy,
        updater::{SyncLabelsUpdater, SyncUpdaterConfig},
        BehaviorState, DiscreteAction, DiscreteActionSpace, Step, StdLearningBehavior,
    };
    use test_log::test;

    /// Records everything the agent passes to its behavior.
    struct RecordingBehavior {
        net: DummyNet,
        experiences: Vec<(f32, DiscreteAction, f32, bool)>,
        final_obs: Option<Observation>,
        n_starts: usize,
    }

    impl RecordingBehavior {
        fn new() -> Self {
            Self {
                net: DummyNet::with_q_values(vec![0.0, 1.0]),
                experiences: vec![],
                final_obs: None,
                n_starts: 0,
            }
        }
    }

    impl LearningBehavior<DiscreteAction, DummyNet> for RecordingBehavior {
        fn handle_episode_start(&mut self) {
            self.n_starts += 1;
        }

        fn handle_new_experience(
            &mut self,
            obs: &Observation,
            action: &DiscreteAction,
            reward: f32,
            is_terminal: bool,
        ) -> Result<()> {
            let t = obs.channel("state").map(|c| c[[0]]).unwrap_or(-1.0);
            self.experiences.push((t, *action, reward, is_terminal));
            Ok(())
        }

        fn handle_trailing_reward(&mut self, reward: f32, is_terminal: bool) -> Result<()> {
            if let Some(e) = self.experiences.last_mut() {
                e.2 += reward;
                e.3 |= is_terminal;
            }
            Ok(())
        }

        fn handle_episode_end(&mut self, final_obs: &Observation) -> Result<()> {
            self.final_obs = Some(final_obs.clone());
            Ok(())
        }

        fn notify_before_step(&mut self) -> Result<()> {
            Ok(())
        }

        fn network(&self) -> &DummyNet {
            &self.net
        }

        fn state(&self) -> BehaviorState {
            BehaviorState::Idle
        }
    }

    fn build_agent(
        env_config: DummyEnvConfig,
        config: &LearningAgentConfig,
    ) -> LearningAgent<DummyEnv, DummyNet, GreedyPolicy<DiscreteActionSpace>, RecordingBehavior> {
        let env = DummyEnv::build(&env_config, 0).unwrap();
        let policy = GreedyPolicy::new(env.action_space().clone());
        LearningAgent::build(env, policy, RecordingBehavior::new(), config).unwrap()
    }

    #[test]
    fn test_episode() {
        let mut agent = build_agent(
            DummyEnvConfig::default().steps_per_episode(3),
            &LearningAgentConfig::default(),
        );
        let stat = agent.run().unwrap();
        assert_eq!(stat.steps, 3);
        assert_eq!(stat.reward, 3.0);
        assert!(!stat.stop_requested);

        let b = agent.behavior();
        assert_eq!(b.n_starts, 1);
        assert_eq!(
            b.experiences,
            vec![
                (0.0, DiscreteAction(1), 1.0, false),
                (1.0, DiscreteAction(1), 1.0, false),
                (2.0, DiscreteAction(1), 1.0, true),
            ]
        );
        assert_eq!(b.final_obs, Some(Observation::from_vec("state", vec![3.0])));
    }

    #[test]
    fn test_skipped_frames() {
        let env_config = DummyEnvConfig::default()
            .steps_per_episode(5)
            .skip_every(Some(2));
        let mut agent = build_agent(env_config, &LearningAgentConfig::default());
        agent.run().unwrap();

        // Observations 2 and 4 are skipped. The rewards of their steps and the end of
        // the episode are credited to the transition from 3.
        assert_eq!(
            agent.behavior().experiences,
            vec![
                (0.0, DiscreteAction(1), 1.0, false),
                (1.0, DiscreteAction(1), 1.0, false),
                (3.0, DiscreteAction(1), 3.0, true),
            ]
        );
        assert_eq!(
            agent.behavior().final_obs,
            Some(Observation::from_vec("state", vec![5.0]))
        );
        assert_eq!(agent.env().actions(), &[1, 1, 1, 1, 1]);
    }

    #[test]
    fn test_step_cap_and_constraints() {
        let env_config = DummyEnvConfig::default()
            .steps_per_episode(100)
            .invalid_action(Some(1));
        let config = LearningAgentConfig::default().max_episode_steps(Some(4));
        let mut agent = build_agent(env_config, &config);
        let stat = agent.run().unwrap();
        assert_eq!(stat.steps, 4);
        // The greedy action 1 is invalid, so the policy falls back to action 0.
        assert!(agent.env().actions().iter().all(|&a| a == 0));
        assert!(agent.behavior().experiences.iter().all(|e| !e.3));

        assert!(LearningAgentConfig::default()
            .max_episode_steps(Some(0))
            .validate()
            .is_err());
    }

    struct StopAtStep(usize);

    impl AgentListener<DiscreteAction> for StopAtStep {
        fn on_after_step(
            &mut self,
            _action: &DiscreteAction,
            _step: &Step,
        ) -> Result<ListenerResponse> {
            self.0 -= 1;
            if self.0 == 0 {
                Ok(ListenerResponse::Stop)
            } else {
                Ok(ListenerResponse::Continue)
            }
        }
    }

    struct FailBeforeStep;

    impl AgentListener<DiscreteAction> for FailBeforeStep {
        fn on_before_step(&mut self, _obs: &Observation) -> Result<ListenerResponse> {
            anyhow::bail!("listener failure")
        }
    }

    #[test]
    fn test_listeners() {
        let mut agent = build_agent(DummyEnvConfig::default(), &LearningAgentConfig::default())
            .with_listener(Box::new(StopAtStep(2)));
        let stat = agent.run().unwrap();
        assert!(stat.stop_requested);
        assert_eq!(stat.steps, 2);
        assert_eq!(agent.behavior().experiences.len(), 2);

        let mut agent = build_agent(DummyEnvConfig::default(), &LearningAgentConfig::default())
            .with_listener(Box::new(FailBeforeStep));
        assert!(agent.run().is_err());
        assert!(agent.behavior().experiences.is_empty());
        assert!(agent.env().actions().is_empty());
    }

    #[test]
    fn test_with_std_behavior() {
        let env = DummyEnv::build(&DummyEnvConfig::default().steps_per_episode(6), 0).unwrap();
        let space = env.action_space().clone();
        let handler = TrajectoryHandler::build(&TrajectoryConfig::default().batch_size(2)).unwrap();
        let alg = NStepQLearning::build(space.clone(), &NStepConfig::default()).unwrap();
        let updater = SyncLabelsUpdater::build(
            DummyNet::with_q_values(vec![0.0, 1.0]),
            &SyncUpdaterConfig::default(),
        )
        .unwrap();
        let behavior = StdLearningBehavior::new(handler, alg, updater);
        let mut agent = LearningAgent::build(
            env,
            GreedyPolicy::new(space),
            behavior,
            &LearningAgentConfig::default(),
        )
        .unwrap();

        agent.run().unwrap();
        // Batches of 2 after the 3rd and 5th step, the rest at episode end.
        assert_eq!(agent.behavior().rule().n_updates(), 3);
        assert_eq!(agent.behavior().network().n_fits(), 3);
        assert!(agent.behavior().handler().is_empty());
        assert_eq!(agent.behavior().state(), BehaviorState::Idle);
    }
}
