//! Learning behavior: experience handling plus an update rule.
use crate::{
    algorithm::UpdateAlgorithm, experience::ExperienceHandler, updater::NeuralNetUpdater,
    Observation, TrainingBatch,
};
use anyhow::Result;
use log::{debug, trace};
use std::marker::PhantomData;

/// Phase of a [`LearningBehavior`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BehaviorState {
    /// No episode is running.
    Idle,

    /// An episode is running and the current network is up to date.
    EpisodeActive,

    /// A batch has been consumed during the episode and the current network has not
    /// been synchronized since.
    BatchPending,
}

/// Learns from the experience of a [`LearningAgent`](crate::LearningAgent).
pub trait LearningBehavior<A, N> {
    /// Prepares for a new episode.
    fn handle_episode_start(&mut self);

    /// Records a transition and trains if a batch is ready.
    fn handle_new_experience(
        &mut self,
        obs: &Observation,
        action: &A,
        reward: f32,
        is_terminal: bool,
    ) -> Result<()>;

    /// Credits `reward` to the last recorded transition and marks it terminal if
    /// `is_terminal` holds.
    ///
    /// Called before [`LearningBehavior::handle_episode_end`] when steps taken after
    /// the last recorded transition yielded rewards or ended the episode.
    fn handle_trailing_reward(&mut self, reward: f32, is_terminal: bool) -> Result<()>;

    /// Records the last observation of the episode and trains on what is left.
    fn handle_episode_end(&mut self, final_obs: &Observation) -> Result<()>;

    /// Called before each action selection.
    fn notify_before_step(&mut self) -> Result<()>;

    /// The network the agent acts with.
    fn network(&self) -> &N;

    /// Phase of the behavior.
    fn state(&self) -> BehaviorState;
}

/// An update algorithm paired with the updater that applies its labels.
pub struct UpdateRule<G, U> {
    algorithm: G,
    updater: U,
    n_updates: usize,
}

impl<G, U> UpdateRule<G, U> {
    /// Constructs the rule.
    pub fn new(algorithm: G, updater: U) -> Self {
        Self {
            algorithm,
            updater,
            n_updates: 0,
        }
    }

    /// Computes labels for `batch` and applies them.
    pub fn apply<N, T>(&mut self, batch: &TrainingBatch<T>) -> Result<()>
    where
        G: UpdateAlgorithm<N, T>,
        U: NeuralNetUpdater<N>,
    {
        let fl = <G as UpdateAlgorithm<N, T>>::compute(&self.algorithm, &self.updater, batch)?;
        self.updater.update(fl)?;
        self.n_updates += 1;
        Ok(())
    }

    /// The updater.
    pub fn updater(&self) -> &U {
        &self.updater
    }

    /// Mutable access to the updater.
    pub fn updater_mut(&mut self) -> &mut U {
        &mut self.updater
    }

    /// Number of applied batches.
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Feeds experience to a handler and trains whenever a batch is ready.
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Idle
///     Idle --> EpisodeActive: handle_episode_start
///     EpisodeActive --> BatchPending: batch consumed
///     BatchPending --> BatchPending: batch consumed
///     BatchPending --> EpisodeActive: notify_before_step
///     EpisodeActive --> Idle: handle_episode_end
///     BatchPending --> Idle: handle_episode_end
/// ```
///
/// The current network is synchronized at most once per consumed batch. A batch
/// consumed at the end of an episode is synchronized right away.
pub struct StdLearningBehavior<A, N, H, G, U> {
    handler: H,
    rule: UpdateRule<G, U>,
    state: BehaviorState,
    phantom: PhantomData<(A, N)>,
}

impl<A, N, H, G, U> StdLearningBehavior<A, N, H, G, U>
where
    H: ExperienceHandler<A>,
    G: UpdateAlgorithm<N, H::Transition>,
    U: NeuralNetUpdater<N>,
{
    /// Constructs the behavior.
    pub fn new(handler: H, algorithm: G, updater: U) -> Self {
        Self {
            handler,
            rule: UpdateRule::new(algorithm, updater),
            state: BehaviorState::Idle,
            phantom: PhantomData,
        }
    }

    /// The experience handler.
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// The update rule.
    pub fn rule(&self) -> &UpdateRule<G, U> {
        &self.rule
    }

    fn train_if_ready(&mut self) -> Result<bool> {
        if !self.handler.is_training_batch_ready() {
            return Ok(false);
        }
        let batch = self.handler.generate_training_batch();
        if batch.is_empty() {
            return Ok(false);
        }
        trace!("Training on a batch of {} transitions", batch.len());
        self.rule.apply::<N, H::Transition>(&batch)?;
        Ok(true)
    }
}

impl<A, N, H, G, U> LearningBehavior<A, N> for StdLearningBehavior<A, N, H, G, U>
where
    H: ExperienceHandler<A>,
    G: UpdateAlgorithm<N, H::Transition>,
    U: NeuralNetUpdater<N>,
{
    fn handle_episode_start(&mut self) {
        self.handler.reset();
        self.rule.updater_mut().reset_current();
        self.state = BehaviorState::EpisodeActive;
    }

    fn handle_new_experience(
        &mut self,
        obs: &Observation,
        action: &A,
        reward: f32,
        is_terminal: bool,
    ) -> Result<()> {
        self.handler.add_experience(obs, action, reward, is_terminal);
        if self.train_if_ready()? {
            self.state = BehaviorState::BatchPending;
        }
        Ok(())
    }

    fn handle_trailing_reward(&mut self, reward: f32, is_terminal: bool) -> Result<()> {
        self.handler.amend_last_experience(reward, is_terminal);
        Ok(())
    }

    fn handle_episode_end(&mut self, final_obs: &Observation) -> Result<()> {
        self.handler.set_final_observation(final_obs);
        let trained = self.train_if_ready()?;
        if trained || self.state == BehaviorState::BatchPending {
            self.rule.updater_mut().synchronize_current()?;
            debug!("Synchronized current network at episode end");
        }
        self.state = BehaviorState::Idle;
        Ok(())
    }

    fn notify_before_step(&mut self) -> Result<()> {
        if self.state == BehaviorState::BatchPending {
            self.rule.updater_mut().synchronize_current()?;
            self.state = BehaviorState::EpisodeActive;
        }
        Ok(())
    }

    fn network(&self) -> &N {
        self.rule.updater().current()
    }

    fn state(&self) -> BehaviorState {
        self.state
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        algorithm::{NStepConfig, NStepQLearning},
        dummy::DummyNet,
        experience::{TrajectoryConfig, TrajectoryHandler},
        DiscreteAction, DiscreteActionSpace, FeaturesLabels, NetOutputs, NetworkRoles, NeuralNet,
    };

    // Fits in place and counts synchronizations.
    struct CountingUpdater {
        net: DummyNet,
        n_syncs: usize,
    }

    impl NetworkRoles<DummyNet> for CountingUpdater {
        fn current(&self) -> &DummyNet {
            &self.net
        }

        fn target_output(&self, obs: &Observation) -> Result<NetOutputs> {
            self.net.output(obs)
        }
    }

    impl NeuralNetUpdater<DummyNet> for CountingUpdater {
        fn update(&mut self, fl: FeaturesLabels) -> Result<()> {
            self.net.fit(&fl)
        }

        fn synchronize_current(&mut self) -> Result<()> {
            self.n_syncs += 1;
            Ok(())
        }

        fn reset_current(&mut self) {}
    }

    fn obs(t: f32) -> Observation {
        Observation::from_vec("state", vec![t])
    }

    #[test]
    fn test_synchronize_once_per_batch() {
        let handler =
            TrajectoryHandler::build(&TrajectoryConfig::default().batch_size(2)).unwrap();
        let alg =
            NStepQLearning::build(DiscreteActionSpace::new(2), &NStepConfig::default()).unwrap();
        let updater = CountingUpdater {
            net: DummyNet::with_q_values(vec![0.0, 0.0]),
            n_syncs: 0,
        };
        let mut b =
            StdLearningBehavior::<DiscreteAction, DummyNet, _, _, _>::new(handler, alg, updater);
        assert_eq!(b.state(), BehaviorState::Idle);

        b.handle_episode_start();
        assert_eq!(b.state(), BehaviorState::EpisodeActive);
        for t in 0..3 {
            b.notify_before_step().unwrap();
            b.handle_new_experience(&obs(t as f32), &DiscreteAction(0), 1.0, false)
                .unwrap();
        }
        // Two transitions are stored after the third add.
        assert_eq!(b.state(), BehaviorState::BatchPending);
        assert_eq!(b.rule().n_updates(), 1);
        assert_eq!(b.rule().updater().n_syncs, 0);

        b.notify_before_step().unwrap();
        b.notify_before_step().unwrap();
        assert_eq!(b.rule().updater().n_syncs, 1);
        assert_eq!(b.state(), BehaviorState::EpisodeActive);

        b.handle_new_experience(&obs(3.0), &DiscreteAction(1), 1.0, true)
            .unwrap();
        b.handle_episode_end(&obs(4.0)).unwrap();
        assert_eq!(b.rule().n_updates(), 2);
        assert_eq!(b.rule().updater().n_syncs, 2);
        assert_eq!(b.state(), BehaviorState::Idle);
        assert_eq!(b.network().n_fits(), 2);
    }

    #[test]
    fn test_no_training_without_batch() {
        let handler =
            TrajectoryHandler::build(&TrajectoryConfig::default().batch_size(5)).unwrap();
        let alg =
            NStepQLearning::build(DiscreteActionSpace::new(2), &NStepConfig::default()).unwrap();
        let updater = CountingUpdater {
            net: DummyNet::with_q_values(vec![0.0, 0.0]),
            n_syncs: 0,
        };
        let mut b =
            StdLearningBehavior::<DiscreteAction, DummyNet, _, _, _>::new(handler, alg, updater);
        b.handle_episode_start();
        b.handle_new_experience(&obs(0.0), &DiscreteAction(0), 1.0, false)
            .unwrap();
        b.handle_new_experience(&obs(1.0), &DiscreteAction(0), 1.0, false)
            .unwrap();
        assert_eq!(b.rule().n_updates(), 0);

        // A new episode discards the partial trajectory.
        b.handle_episode_start();
        assert!(b.handler().is_empty());
    }
}
