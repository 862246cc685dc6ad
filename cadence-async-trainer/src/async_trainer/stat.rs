use crate::{worker_stats_fmt, WorkerStat};
use cadence_core::TrainingProgress;
use std::time::Duration;

/// Stats of [`AsyncTrainer`](crate::AsyncTrainer)`::train()`.
#[derive(Clone, Debug)]
pub struct AsyncTrainStat {
    /// Counters over all workers.
    pub progress: TrainingProgress,

    /// Duration of training.
    pub duration: Duration,

    /// Stats of the workers that finished normally, ordered by worker id.
    pub worker_stats: Vec<WorkerStat>,
}

impl AsyncTrainStat {
    /// The number of environment steps per second over all workers.
    pub fn steps_per_sec(&self) -> f32 {
        let d = self.duration.as_secs_f32();
        if d > 0.0 {
            self.progress.step_count as f32 / d
        } else {
            0.0
        }
    }

    /// Returns a formatted string.
    pub fn fmt(&self) -> String {
        let mut s = "episodes, steps, steps/sec, duration\n".to_string();
        s += format!(
            "{}, {}, {}, {}\n",
            self.progress.episode_count,
            self.progress.step_count,
            self.steps_per_sec(),
            self.duration.as_secs_f32()
        )
        .as_str();
        s += worker_stats_fmt(&self.worker_stats).as_str();
        s
    }
}
