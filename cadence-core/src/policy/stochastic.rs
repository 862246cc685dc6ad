//! Policy sampling from an action distribution.
use super::Policy;
use crate::{error::TrainingError, ActionSpace, NeuralNet, Observation, POLICY};
use anyhow::Result;
use fastrand::Rng;

const SUM_TOLERANCE: f32 = 1e-4;

/// Samples an action from the `Policy` output of the network.
#[derive(Clone, Debug)]
pub struct StochasticPolicy<S> {
    space: S,
    rng: Rng,
}

impl<S: ActionSpace> StochasticPolicy<S> {
    /// Constructs the policy with a seeded random number generator.
    pub fn new(space: S, seed: u64) -> Self {
        Self {
            space,
            rng: Rng::with_seed(seed),
        }
    }

    /// Draws an index by subtracting probabilities from a uniform draw.
    fn sample(&mut self, probs: &[f32]) -> usize {
        let total: f32 = probs.iter().sum();
        let mut u = self.rng.f32() * total;
        for (i, &p) in probs.iter().enumerate() {
            if u < p {
                return i;
            }
            u -= p;
        }
        // Rounding may leave a small positive remainder.
        probs.iter().rposition(|&p| p > 0.0).unwrap_or(probs.len() - 1)
    }
}

fn check_distribution(probs: &[f32]) -> Result<()> {
    let sum: f32 = probs.iter().sum();
    if (sum - 1.0).abs() > SUM_TOLERANCE || sum.is_nan() {
        return Err(TrainingError::NotAProbabilityDistribution(sum).into());
    }
    Ok(())
}

impl<N: NeuralNet, S: ActionSpace> Policy<N, S::Action> for StochasticPolicy<S> {
    fn next_action(&mut self, net: &N, obs: &Observation) -> Result<S::Action> {
        let out = net.output(obs)?;
        let probs = out.get(POLICY)?.to_vec();
        check_distribution(&probs)?;
        let ix = self.sample(&probs);
        self.space.from_index(ix)
    }

    /// Samples from the distribution restricted to legal actions.
    fn next_legal_action(
        &mut self,
        net: &N,
        obs: &Observation,
        is_legal: &dyn Fn(&S::Action) -> bool,
    ) -> Result<S::Action> {
        let out = net.output(obs)?;
        let mut probs = out.get(POLICY)?.to_vec();
        check_distribution(&probs)?;
        for (ix, p) in probs.iter_mut().enumerate() {
            if !is_legal(&self.space.from_index(ix)?) {
                *p = 0.0;
            }
        }
        if probs.iter().all(|&p| p <= 0.0) {
            return Err(TrainingError::NoValidAction.into());
        }
        let ix = self.sample(&probs);
        self.space.from_index(ix)
    }
}
