//! Greedy policy.
use super::Policy;
use crate::{error::TrainingError, ActionSpace, NeuralNet, Observation, Q_VALUES};
use anyhow::Result;

/// Takes the action with the highest network output.
#[derive(Clone, Debug)]
pub struct GreedyPolicy<S> {
    space: S,
    output_name: String,
}

impl<S: ActionSpace> GreedyPolicy<S> {
    /// Constructs a greedy policy reading the `QValues` output.
    pub fn new(space: S) -> Self {
        Self {
            space,
            output_name: Q_VALUES.to_string(),
        }
    }

    /// Sets the name of the output to maximize.
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }
}

impl<N: NeuralNet, S: ActionSpace> Policy<N, S::Action> for GreedyPolicy<S> {
    fn next_action(&mut self, net: &N, obs: &Observation) -> Result<S::Action> {
        let out = net.output(obs)?;
        let ix = out.argmax(&self.output_name)?;
        self.space.from_index(ix)
    }

    /// Takes the legal action with the highest output.
    ///
    /// NaN outputs are skipped. If every legal output is NaN, the legal action with the
    /// lowest index is taken.
    fn next_legal_action(
        &mut self,
        net: &N,
        obs: &Observation,
        is_legal: &dyn Fn(&S::Action) -> bool,
    ) -> Result<S::Action> {
        let out = net.output(obs)?;
        let values = out.get(&self.output_name)?;
        let mut first_legal = None;
        let mut best: Option<(S::Action, f32)> = None;
        for (ix, &v) in values.iter().enumerate() {
            let a = self.space.from_index(ix)?;
            if !is_legal(&a) {
                continue;
            }
            if first_legal.is_none() {
                first_legal = Some(a.clone());
            }
            match &best {
                _ if v.is_nan() => {}
                Some((_, b)) if v <= *b => {}
                _ => best = Some((a, v)),
            }
        }
        best.map(|(a, _)| a)
            .or(first_legal)
            .ok_or_else(|| TrainingError::NoValidAction.into())
    }
}
