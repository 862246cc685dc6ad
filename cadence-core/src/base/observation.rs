//! Observation.
use ndarray::{Array1, ArrayD};

/// One perception frame of an environment.
///
/// An observation is an ordered set of named channels. It is immutable once
/// constructed; components keeping it past the current step store a clone.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    channels: Vec<(String, ArrayD<f32>)>,
    is_skipped: bool,
}

impl Observation {
    /// Constructs an observation from named channels.
    pub fn new(channels: Vec<(String, ArrayD<f32>)>) -> Self {
        Self {
            channels,
            is_skipped: false,
        }
    }

    /// Constructs an observation with a single one-dimensional channel.
    pub fn from_vec(name: impl Into<String>, values: Vec<f32>) -> Self {
        Self::new(vec![(name.into(), Array1::from(values).into_dyn())])
    }

    /// Constructs an observation the environment marks as skipped.
    ///
    /// Skipped observations are shown to the agent but never recorded as experience.
    pub fn skipped(channels: Vec<(String, ArrayD<f32>)>) -> Self {
        Self {
            channels,
            is_skipped: true,
        }
    }

    /// Returns `true` if the frame was skipped by the environment.
    pub fn is_skipped(&self) -> bool {
        self.is_skipped
    }

    /// Returns the channel with the given name.
    pub fn channel(&self, name: &str) -> Option<&ArrayD<f32>> {
        self.channels
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Returns all channels in order.
    pub fn channels(&self) -> &[(String, ArrayD<f32>)] {
        &self.channels
    }
}
