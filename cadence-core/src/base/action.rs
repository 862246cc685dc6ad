//! Actions and action spaces.
use crate::error::TrainingError;
use anyhow::Result;
use fastrand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// An action taken in an environment.
pub trait Action: Clone + Debug + Send + 'static {
    /// Returns the flat representation consumed by environments and networks.
    fn encode(&self) -> Vec<f32>;
}

/// An action given by its index in a discrete action space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscreteAction(pub usize);

impl DiscreteAction {
    /// Index of the action.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl Action for DiscreteAction {
    fn encode(&self) -> Vec<f32> {
        vec![self.0 as f32]
    }
}

/// A real-valued action vector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContinuousAction(pub Vec<f32>);

impl Action for ContinuousAction {
    fn encode(&self) -> Vec<f32> {
        self.0.clone()
    }
}

/// The universe of actions valid in an environment.
pub trait ActionSpace: Clone + Debug + Send + Sync + 'static {
    /// Type of actions in this space.
    type Action: Action;

    /// Number of actions, or the dimension of the action vector for continuous spaces.
    fn size(&self) -> usize;

    /// The action doing nothing.
    fn noop(&self) -> Self::Action;

    /// Samples an action uniformly.
    fn random_action(&self, rng: &mut Rng) -> Self::Action;

    /// Samples an action satisfying `is_valid`.
    ///
    /// The default implementation uses rejection sampling and gives up after a fixed
    /// number of draws.
    fn random_valid_action(
        &self,
        rng: &mut Rng,
        is_valid: &dyn Fn(&Self::Action) -> bool,
    ) -> Result<Self::Action> {
        for _ in 0..MAX_REJECTIONS {
            let a = self.random_action(rng);
            if is_valid(&a) {
                return Ok(a);
            }
        }
        Err(TrainingError::NoValidAction.into())
    }

    /// Index of the per-action network output addressing `action`.
    fn action_index(&self, action: &Self::Action) -> Result<usize>;

    /// Decodes an index produced from a network output, e.g. by arg-max or sampling.
    fn from_index(&self, index: usize) -> Result<Self::Action>;
}

const MAX_REJECTIONS: usize = 1000;

/// A finite set of actions `0..n`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteActionSpace {
    n: usize,
    noop: usize,
}

impl DiscreteActionSpace {
    /// Constructs a space of `n` actions with `0` as the no-op action.
    pub fn new(n: usize) -> Self {
        Self { n, noop: 0 }
    }

    /// Sets the no-op action.
    pub fn noop_index(mut self, noop: usize) -> Self {
        self.noop = noop;
        self
    }

    fn check(&self, index: usize) -> Result<usize> {
        if index < self.n {
            Ok(index)
        } else {
            Err(TrainingError::ActionIndexOutOfRange {
                index,
                size: self.n,
            }
            .into())
        }
    }
}

impl ActionSpace for DiscreteActionSpace {
    type Action = DiscreteAction;

    fn size(&self) -> usize {
        self.n
    }

    fn noop(&self) -> DiscreteAction {
        DiscreteAction(self.noop)
    }

    fn random_action(&self, rng: &mut Rng) -> DiscreteAction {
        DiscreteAction(rng.usize(..self.n))
    }

    /// Samples uniformly among the actions satisfying `is_valid`.
    fn random_valid_action(
        &self,
        rng: &mut Rng,
        is_valid: &dyn Fn(&DiscreteAction) -> bool,
    ) -> Result<DiscreteAction> {
        let valid = (0..self.n)
            .map(DiscreteAction)
            .filter(|a| is_valid(a))
            .collect::<Vec<_>>();
        if valid.is_empty() {
            return Err(TrainingError::NoValidAction.into());
        }
        Ok(valid[rng.usize(..valid.len())])
    }

    fn action_index(&self, action: &DiscreteAction) -> Result<usize> {
        self.check(action.0)
    }

    fn from_index(&self, index: usize) -> Result<DiscreteAction> {
        Ok(DiscreteAction(self.check(index)?))
    }
}

/// A box `[low, high]` of real-valued actions.
///
/// Actions of this space can not be addressed by index, so it only works with
/// policies sampling directly from the space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContinuousActionSpace {
    low: Vec<f32>,
    high: Vec<f32>,
}

impl ContinuousActionSpace {
    /// Constructs the space, failing when the bounds disagree in length or order.
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Result<Self> {
        crate::config::ensure_config(
            low.len() == high.len() && low.iter().zip(high.iter()).all(|(l, h)| l <= h),
            "bounds of a continuous action space must have the same length and low <= high",
        )?;
        Ok(Self { low, high })
    }
}

impl ActionSpace for ContinuousActionSpace {
    type Action = ContinuousAction;

    fn size(&self) -> usize {
        self.low.len()
    }

    fn noop(&self) -> ContinuousAction {
        ContinuousAction(
            self.low
                .iter()
                .zip(self.high.iter())
                .map(|(&l, &h)| 0f32.max(l).min(h))
                .collect(),
        )
    }

    fn random_action(&self, rng: &mut Rng) -> ContinuousAction {
        ContinuousAction(
            self.low
                .iter()
                .zip(self.high.iter())
                .map(|(&l, &h)| l + rng.f32() * (h - l))
                .collect(),
        )
    }

    fn action_index(&self, _action: &ContinuousAction) -> Result<usize> {
        Err(TrainingError::ActionNotIndexable.into())
    }

    fn from_index(&self, _index: usize) -> Result<ContinuousAction> {
        Err(TrainingError::ActionNotIndexable.into())
    }
}
