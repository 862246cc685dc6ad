//! Multi-threaded trainer.
mod config;
mod stat;
use crate::{
    worker::{SharedProgress, Stopping, Worker},
    WorkerMessage, WorkerStat,
};
use anyhow::Result;
use cadence_core::{error::TrainingError, record::Recorder, AgentBuilder, TrainingProgress};
pub use config::AsyncTrainerConfig;
use crossbeam_channel::unbounded;
use log::{info, warn};
pub use stat::AsyncTrainStat;
use std::{
    sync::{Arc, Mutex},
    thread,
    time::Instant,
};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs agents on several threads until a shared stopping predicate holds.
///
/// ```mermaid
/// graph LR
///     Trainer -->|spawn| W0[Worker 0]
///     Trainer -->|spawn| W1[Worker 1]
///     W0 -->|WorkerMessage| Trainer
///     W1 -->|WorkerMessage| Trainer
///     W0 -->|gradients| SharedNetworks
///     W1 -->|gradients| SharedNetworks
///     Trainer -->|Record| Recorder
/// ```
///
/// Each worker builds its own agent with the [`AgentBuilder`], one worker at a time,
/// and plays episodes until the stop flag is raised. After every episode the shared
/// counters are incremented and the stopping predicate is evaluated under one lock;
/// a worker that sees the predicate hold raises the flag. Episodes already running on
/// other workers are finished and counted.
///
/// A worker failing with an error stops alone. The others continue, and the first
/// error is returned by [`AsyncTrainer::train`] once every worker has stopped.
pub struct AsyncTrainer<B> {
    builder: Arc<B>,
    stopping: Arc<Stopping>,
    num_threads: usize,
    record_interval: usize,
    progress: TrainingProgress,
}

impl<B> AsyncTrainer<B>
where
    B: AgentBuilder + Send + Sync + 'static,
{
    /// Constructs the trainer.
    pub fn build(
        builder: B,
        config: &AsyncTrainerConfig,
        stopping: impl Fn(&TrainingProgress) -> bool + Send + Sync + 'static,
    ) -> Result<Self> {
        config.validate()?;
        builder.validate()?;
        Ok(Self {
            builder: Arc::new(builder),
            stopping: Arc::new(stopping),
            num_threads: config.num_threads,
            record_interval: config.record_interval,
            progress: TrainingProgress::default(),
        })
    }

    /// The agent builder.
    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// Counters of the latest training run.
    pub fn progress(&self) -> TrainingProgress {
        self.progress
    }

    /// Trains agents on `num_threads` threads until the stopping predicate holds.
    pub fn train(&mut self, recorder: &mut dyn Recorder) -> Result<AsyncTrainStat> {
        let progress = Arc::new(SharedProgress::default());
        let guard_init_env = Arc::new(Mutex::new(()));
        let (sender, receiver) = unbounded();
        let time = Instant::now();

        let threads = (0..self.num_threads)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    self.builder.clone(),
                    self.stopping.clone(),
                    progress.clone(),
                    guard_init_env.clone(),
                    sender.clone(),
                );
                thread::spawn(move || worker.run())
            })
            .collect::<Vec<_>>();
        info!("Started {} workers", self.num_threads);

        // Workers hold the remaining senders
        drop(sender);

        let mut worker_stats: Vec<WorkerStat> = vec![];
        for msg in receiver.iter() {
            match msg {
                WorkerMessage::Episode {
                    worker_id,
                    episode,
                    stat,
                } => {
                    if episode % self.record_interval == 0 {
                        recorder.write(stat.to_record(worker_id, episode));
                        info!(
                            "Episode {} (worker {}): steps = {}, reward = {}",
                            episode, worker_id, stat.steps, stat.reward
                        );
                    }
                }
                WorkerMessage::Finished(stat) => worker_stats.push(stat),
                WorkerMessage::Failed { worker_id, error } => {
                    warn!("Worker {} left training: {}", worker_id, error);
                }
            }
        }

        let mut first_error = None;
        for (id, handle) in threads.into_iter().enumerate() {
            let result = match handle.join() {
                Ok(result) => result.map(|_| ()),
                Err(_) => Err(TrainingError::WorkerPanicked(id).into()),
            };
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        self.progress = progress.progress();
        info!(
            "Finished training: {} episodes, {} steps",
            self.progress.episode_count, self.progress.step_count
        );
        if let Some(e) = first_error {
            return Err(e);
        }

        worker_stats.sort_by_key(|s| s.worker_id);
        Ok(AsyncTrainStat {
            progress: self.progress,
            duration: time.elapsed(),
            worker_stats,
        })
    }
}
