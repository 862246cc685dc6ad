//! Handler of on-policy trajectories.
use super::ExperienceHandler;
use crate::{
    config::ensure_config, ConfigFile, Observation, StateActionReward, TrainingBatch,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration of [`TrajectoryHandler`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrajectoryConfig {
    /// Number of transitions in a batch.
    pub batch_size: usize,
}

impl Default for TrajectoryConfig {
    fn default() -> Self {
        Self { batch_size: 5 }
    }
}

impl TrajectoryConfig {
    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Checks the batch size is positive.
    pub fn validate(&self) -> Result<()> {
        ensure_config(self.batch_size >= 1, "batch_size must be at least 1")
    }
}

impl ConfigFile for TrajectoryConfig {}

/// Collects the latest transitions of an episode and hands them out once.
///
/// The transition added last stays pending until the next one arrives, so the
/// observation following every stored transition is known when a batch is generated.
/// That observation is returned as the batch's final observation.
pub struct TrajectoryHandler<A> {
    batch_size: usize,
    storage: Vec<StateActionReward<A>>,
    pending: Option<StateActionReward<A>>,
    final_obs: Option<Observation>,
    is_final: bool,
}

impl<A: Clone> TrajectoryHandler<A> {
    /// Constructs the handler.
    pub fn build(config: &TrajectoryConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            batch_size: config.batch_size,
            storage: Vec::with_capacity(config.batch_size),
            pending: None,
            final_obs: None,
            is_final: false,
        })
    }

    fn commit_pending(&mut self) {
        if let Some(t) = self.pending.take() {
            self.storage.push(t);
        }
    }
}

impl<A: Clone> ExperienceHandler<A> for TrajectoryHandler<A> {
    type Transition = StateActionReward<A>;

    fn add_experience(&mut self, obs: &Observation, action: &A, reward: f32, is_terminal: bool) {
        self.commit_pending();
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
        self.commit_pending();
        self.final_obs = Some(obs.clone());
        self.is_final = true;
    }

    fn is_training_batch_ready(&self) -> bool {
        self.storage.len() >= self.batch_size || (self.is_final && !self.storage.is_empty())
    }

    /// Drains the stored transitions.
    fn generate_training_batch(&mut self) -> TrainingBatch<Self::Transition> {
        let transitions = std::mem::take(&mut self.storage);
        let final_observation = match &self.final_obs {
            Some(obs) => Some(obs.clone()),
            None => self.pending.as_ref().map(|t| t.obs.clone()),
        };
        TrainingBatch::new(transitions, final_observation)
    }

    fn reset(&mut self) {
        self.storage.clear();
        self.pending = None;
        self.final_obs = None;
        self.is_final = false;
    }

    fn len(&self) -> usize {
        self.storage.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::DiscreteAction;

    fn obs(t: f32) -> Observation {
        Observation::from_vec("state", vec![t])
    }

    #[test]
    fn test_batch_is_drained() {
        let config = TrajectoryConfig::default().batch_size(2);
        let mut h = TrajectoryHandler::build(&config).unwrap();
        h.add_experience(&obs(0.0), &DiscreteAction(0), 1.0, false);
        h.add_experience(&obs(1.0), &DiscreteAction(1), 2.0, false);
        assert_eq!(h.len(), 1);
        assert!(!h.is_training_batch_ready());

        h.add_experience(&obs(2.0), &DiscreteAction(0), 3.0, false);
        assert!(h.is_training_batch_ready());
        let batch = h.generate_training_batch();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.transitions()[0].reward, 1.0);
        assert_eq!(batch.transitions()[1].reward, 2.0);
        // The pending transition's observation follows the last stored one.
        assert_eq!(batch.final_observation(), Some(&obs(2.0)));

        assert_eq!(h.len(), 0);
        assert!(!h.is_training_batch_ready());
        assert!(h.generate_training_batch().is_empty());
    }

    #[test]
    fn test_final_observation() {
        let config = TrajectoryConfig::default().batch_size(10);
        let mut h = TrajectoryHandler::build(&config).unwrap();
        h.add_experience(&obs(0.0), &DiscreteAction(0), 1.0, false);
        assert!(!h.is_training_batch_ready());
        h.add_experience(&obs(1.0), &DiscreteAction(1), 2.0, true);
        h.set_final_observation(&obs(2.0));
        assert!(h.is_training_batch_ready());

        let batch = h.generate_training_batch();
        assert_eq!(batch.len(), 2);
        assert!(batch.transitions()[1].is_terminal);
        assert_eq!(batch.final_observation(), Some(&obs(2.0)));
        assert!(!h.is_training_batch_ready());

        h.reset();
        assert!(h.is_empty());
        h.add_experience(&obs(0.0), &DiscreteAction(0), 1.0, false);
        assert!(!h.is_training_batch_ready());
    }

    #[test]
    fn test_amend_last_experience() {
        let config = TrajectoryConfig::default().batch_size(10);
        let mut h = TrajectoryHandler::build(&config).unwrap();
        h.add_experience(&obs(0.0), &DiscreteAction(0), 1.0, false);
        h.add_experience(&obs(1.0), &DiscreteAction(1), 1.0, false);
        h.amend_last_experience(2.0, true);
        h.set_final_observation(&obs(4.0));

        let batch = h.generate_training_batch();
        assert_eq!(batch.transitions()[0].reward, 1.0);
        assert!(!batch.transitions()[0].is_terminal);
        assert_eq!(batch.transitions()[1].reward, 3.0);
        assert!(batch.transitions()[1].is_terminal);

        // Nothing is pending after the episode ended.
        h.amend_last_experience(5.0, false);
        assert!(h.is_empty());
    }

    #[test]
    fn test_invalid_batch_size() {
        let config = TrajectoryConfig::default().batch_size(0);
        assert!(TrajectoryHandler::<DiscreteAction>::build(&config).is_err());
    }
}
