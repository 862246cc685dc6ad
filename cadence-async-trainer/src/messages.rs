use crate::WorkerStat;
use cadence_core::EpisodeStat;

/// Message sent from a worker thread to [`AsyncTrainer`](crate::AsyncTrainer).
#[derive(Clone, Debug)]
pub enum WorkerMessage {
    /// An episode finished.
    Episode {
        /// Id of the worker that played the episode.
        worker_id: usize,

        /// Global count of finished episodes including this one.
        episode: usize,

        /// Summary of the episode.
        stat: EpisodeStat,
    },

    /// The worker left its episode loop normally.
    Finished(WorkerStat),

    /// The worker stopped with an error.
    Failed {
        /// Id of the worker.
        worker_id: usize,

        /// Description of the error.
        error: String,
    },
}
