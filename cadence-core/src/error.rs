//! Errors in the library.
use thiserror::Error;

/// Errors raised by the training core.
///
/// Configuration errors are reported when a component is built. The other variants
/// signal a broken invariant in a collaborator and are meant to stop training; they are
/// never retried inside the core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrainingError {
    /// A configuration value or a combination of them is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An update algorithm received a batch without transitions.
    #[error("Training batch is empty")]
    EmptyBatch,

    /// An action index does not address an entry of the action space.
    #[error("Action index {index} is out of range for {size} actions")]
    ActionIndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of entries available.
        size: usize,
    },

    /// The action space can not map actions to indices.
    #[error("Actions of this action space are not indexable")]
    ActionNotIndexable,

    /// No action satisfies the validity predicate of the environment.
    #[error("No valid action is available")]
    NoValidAction,

    /// A network output that should be a probability distribution is not.
    #[error("Network output is not a probability distribution (sum = {0})")]
    NotAProbabilityDistribution(f32),

    /// A named network output is missing or empty.
    #[error("Network output is missing or empty: {0}")]
    MissingOutput(String),

    /// A network output does not have the expected length.
    #[error("Network output {name} has length {actual}, expected {expected}")]
    OutputShape {
        /// Name of the output.
        name: String,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// A trajectory batch needs an observation to bootstrap from, but has none.
    #[error("Training batch has no final observation to bootstrap from")]
    MissingFinalObservation,

    /// A lock guarding shared state was poisoned by a panicking thread.
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),

    /// A worker thread panicked.
    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),

    /// A listener hook failed.
    #[error("Listener failed: {0}")]
    ListenerFailed(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
