//! Network capability and its outputs.
use super::Observation;
use crate::error::TrainingError;
use anyhow::Result;
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Name of the per-action value output.
pub const Q_VALUES: &str = "QValues";

/// Name of the state value output.
pub const VALUE: &str = "Value";

/// Name of the action probability output.
pub const POLICY: &str = "Policy";

/// Named outputs of a forward pass on a single observation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NetOutputs(HashMap<String, Array1<f32>>);

impl NetOutputs {
    /// Constructs empty outputs.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Inserts an output.
    pub fn insert(&mut self, name: impl Into<String>, values: Array1<f32>) {
        self.0.insert(name.into(), values);
    }

    /// Adds an output, builder style.
    pub fn with(mut self, name: impl Into<String>, values: Vec<f32>) -> Self {
        self.insert(name, Array1::from(values));
        self
    }

    /// Returns the output with the given name, failing when it is missing or empty.
    pub fn get(&self, name: &str) -> Result<&Array1<f32>> {
        match self.0.get(name) {
            Some(v) if !v.is_empty() => Ok(v),
            _ => Err(TrainingError::MissingOutput(name.to_string()).into()),
        }
    }

    /// Index of the first maximal entry of the given output.
    ///
    /// NaN entries are skipped; if all entries are NaN, `0` is returned.
    pub fn argmax(&self, name: &str) -> Result<usize> {
        let values = self.get(name)?;
        let mut best: Option<(usize, f32)> = None;
        for (i, &v) in values.iter().enumerate() {
            match best {
                _ if v.is_nan() => {}
                Some((_, b)) if v <= b => {}
                _ => best = Some((i, v)),
            }
        }
        Ok(best.map(|(i, _)| i).unwrap_or(0))
    }

    /// Maximum of the given output. NaN entries make the result NaN.
    pub fn max(&self, name: &str) -> Result<f32> {
        let values = self.get(name)?;
        Ok(values.iter().fold(f32::NEG_INFINITY, |acc, &v| {
            if acc.is_nan() || v.is_nan() {
                f32::NAN
            } else if v > acc {
                v
            } else {
                acc
            }
        }))
    }

    /// Iterates over the outputs.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Array1<f32>)> {
        self.0.iter()
    }
}

/// Named training labels, one row per batch item.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Labels(HashMap<String, Array2<f32>>);

impl Labels {
    /// Constructs empty labels.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Inserts labels under a name.
    pub fn insert(&mut self, name: impl Into<String>, values: Array2<f32>) {
        self.0.insert(name.into(), values);
    }

    /// Returns the labels with the given name.
    pub fn get(&self, name: &str) -> Option<&Array2<f32>> {
        self.0.get(name)
    }

    /// Names of the labels.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }
}

/// Training data for a network: input features and the labels to fit.
#[derive(Clone, Debug, PartialEq)]
pub struct FeaturesLabels {
    /// Observations in chronological order.
    pub features: Vec<Observation>,

    /// Labels, row `i` belongs to `features[i]`.
    pub labels: Labels,
}

impl FeaturesLabels {
    /// Constructs the training data.
    pub fn new(features: Vec<Observation>, labels: Labels) -> Self {
        Self { features, labels }
    }

    /// Number of training samples.
    pub fn batch_size(&self) -> usize {
        self.features.len()
    }
}

/// A trainable function approximator.
///
/// This is an external collaborator: the forward/backward pass, optimizer and tensor
/// math are implemented elsewhere.
pub trait NeuralNet: Clone + Send + 'static {
    /// Gradients computed by the network, applied to another copy of it.
    type Gradients: Send + 'static;

    /// Forward pass on a single observation.
    fn output(&self, obs: &Observation) -> Result<NetOutputs>;

    /// Fits the network to the labels.
    fn fit(&mut self, fl: &FeaturesLabels) -> Result<()>;

    /// Computes gradients of the loss for the labels without applying them.
    fn compute_gradients(&mut self, fl: &FeaturesLabels) -> Result<Self::Gradients>;

    /// Applies gradients computed on a batch of the given size.
    fn apply_gradients(&mut self, gradients: &Self::Gradients, batch_size: usize)
        -> Result<()>;

    /// Overwrites all parameters with those of `other`.
    fn copy_from(&mut self, other: &Self);

    /// Resets internal state of a recurrent network.
    fn reset(&mut self) {}

    /// Returns `true` if the network keeps state across forward passes.
    fn is_recurrent(&self) -> bool {
        false
    }
}

/// Read access to the networks used to compute training labels.
pub trait NetworkRoles<N> {
    /// The network the agent acts with and that receives updates.
    fn current(&self) -> &N;

    /// Forward pass of the target network, used for bootstrapping.
    fn target_output(&self, obs: &Observation) -> Result<NetOutputs>;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_net_outputs() {
        let out = NetOutputs::new()
            .with(Q_VALUES, vec![1.0, 3.0, 3.0, -1.0])
            .with(VALUE, vec![]);
        assert_eq!(out.argmax(Q_VALUES).unwrap(), 1);
        assert_eq!(out.max(Q_VALUES).unwrap(), 3.0);

        for name in [VALUE, POLICY].iter() {
            let err = out.get(name).unwrap_err();
            assert_eq!(
                err.downcast_ref::<TrainingError>(),
                Some(&TrainingError::MissingOutput(name.to_string()))
            );
        }
    }

    #[test]
    fn test_nan_handling() {
        let out = NetOutputs::new().with(Q_VALUES, vec![0.5, f32::NAN, 0.2]);
        assert!(out.max(Q_VALUES).unwrap().is_nan());
        assert_eq!(out.argmax(Q_VALUES).unwrap(), 0);
    }
}
