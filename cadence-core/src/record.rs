//! Types and traits for recording training metrics.
//!
//! Trainers write one [`Record`] per episode to a [`Recorder`]. A record of an
//! episode holds the following keys:
//!
//! * `episode` - running episode count of the trainer
//! * `episode_steps` - number of environment steps of the episode
//! * `episode_reward` - sum of rewards of the episode
//! * `worker` - index of the worker that played the episode
//! * `time` - wall-clock time the record was created
//!
//! # Basic Usage
//!
//! ```rust
//! use cadence_core::record::{Record, RecordValue};
//!
//! let mut record = Record::empty();
//! record.insert("episode", RecordValue::Scalar(1.0));
//! record.insert("episode_reward", RecordValue::Scalar(-3.0));
//! assert_eq!(record.get_scalar("episode_reward").unwrap(), -3.0);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::{LogRecorder, Recorder};
