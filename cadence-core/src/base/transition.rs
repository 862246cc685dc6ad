//! Transitions and training batches.
use super::Observation;

/// Access to the fields shared by all transition types.
pub trait Transition<A>: Clone {
    /// Observation the action was taken in.
    fn obs(&self) -> &Observation;

    /// Action taken.
    fn action(&self) -> &A;

    /// Reward accumulated since the previous recorded transition.
    fn reward(&self) -> f32;

    /// Flag denoting the transition ended the episode.
    fn is_terminal(&self) -> bool;
}

/// A transition without its successor observation.
#[derive(Clone, Debug, PartialEq)]
pub struct StateActionReward<A> {
    /// Observation.
    pub obs: Observation,

    /// Action.
    pub action: A,

    /// Reward.
    pub reward: f32,

    /// Terminal flag.
    pub is_terminal: bool,
}

impl<A> StateActionReward<A> {
    /// Constructs a transition.
    pub fn new(obs: Observation, action: A, reward: f32, is_terminal: bool) -> Self {
        Self {
            obs,
            action,
            reward,
            is_terminal,
        }
    }

    /// Attaches the observation that followed this transition.
    pub fn with_next(self, next_obs: Observation) -> StateActionRewardNext<A> {
        StateActionRewardNext {
            obs: self.obs,
            action: self.action,
            reward: self.reward,
            is_terminal: self.is_terminal,
            next_obs,
        }
    }
}

impl<A: Clone> Transition<A> for StateActionReward<A> {
    fn obs(&self) -> &Observation {
        &self.obs
    }

    fn action(&self) -> &A {
        &self.action
    }

    fn reward(&self) -> f32 {
        self.reward
    }

    fn is_terminal(&self) -> bool {
        self.is_terminal
    }
}

/// A transition together with the observation that followed it.
#[derive(Clone, Debug, PartialEq)]
pub struct StateActionRewardNext<A> {
    /// Observation.
    pub obs: Observation,

    /// Action.
    pub action: A,

    /// Reward.
    pub reward: f32,

    /// Terminal flag.
    pub is_terminal: bool,

    /// Next observation.
    pub next_obs: Observation,
}

impl<A: Clone> Transition<A> for StateActionRewardNext<A> {
    fn obs(&self) -> &Observation {
        &self.obs
    }

    fn action(&self) -> &A {
        &self.action
    }

    fn reward(&self) -> f32 {
        self.reward
    }

    fn is_terminal(&self) -> bool {
        self.is_terminal
    }
}

/// Transitions in chronological order, handed to an update algorithm.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingBatch<T> {
    transitions: Vec<T>,
    final_observation: Option<Observation>,
}

impl<T> TrainingBatch<T> {
    /// Constructs a batch.
    pub fn new(transitions: Vec<T>, final_observation: Option<Observation>) -> Self {
        Self {
            transitions,
            final_observation,
        }
    }

    /// Constructs a batch without transitions.
    pub fn empty() -> Self {
        Self::new(vec![], None)
    }

    /// Number of transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Returns `true` if the batch has no transitions.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Transitions in chronological order.
    pub fn transitions(&self) -> &[T] {
        &self.transitions
    }

    /// Iterates over the transitions in chronological order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.transitions.iter()
    }

    /// Observation following the last transition, if known.
    pub fn final_observation(&self) -> Option<&Observation> {
        self.final_observation.as_ref()
    }
}
