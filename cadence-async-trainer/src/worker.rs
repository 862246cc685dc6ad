//! Worker threads of [`AsyncTrainer`](crate::AsyncTrainer).
mod stat;
use crate::WorkerMessage;
use anyhow::Result;
use cadence_core::{error::TrainingError, AgentBuilder, AgentLearner, TrainingProgress};
use crossbeam_channel::Sender;
use log::{error, info};
pub use stat::{worker_stats_fmt, WorkerStat};
use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};

/// Stopping predicate shared by workers.
pub(crate) type Stopping = dyn Fn(&TrainingProgress) -> bool + Send + Sync;

/// Counters and stop flag shared by the workers of a training run.
#[derive(Default)]
pub(crate) struct SharedProgress {
    episode_count: AtomicUsize,
    step_count: AtomicUsize,
    stop: AtomicBool,
    guard: Mutex<()>,
}

impl SharedProgress {
    /// Counts a finished episode and evaluates the stopping predicate.
    ///
    /// Both happen under one lock, so the predicate sees every episode exactly once.
    fn record_episode(
        &self,
        steps: usize,
        stopping: &Stopping,
    ) -> Result<(TrainingProgress, bool)> {
        let _guard = self
            .guard
            .lock()
            .map_err(|_| TrainingError::LockPoisoned("training progress".to_string()))?;
        let progress = TrainingProgress {
            episode_count: self.episode_count.fetch_add(1, Ordering::SeqCst) + 1,
            step_count: self.step_count.fetch_add(steps, Ordering::SeqCst) + steps,
        };
        Ok((progress, stopping(&progress)))
    }

    pub(crate) fn progress(&self) -> TrainingProgress {
        TrainingProgress {
            episode_count: self.episode_count.load(Ordering::SeqCst),
            step_count: self.step_count.load(Ordering::SeqCst),
        }
    }

    fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }
}

/// Plays episodes with its own agent until training stops.
pub(crate) struct Worker<B> {
    id: usize,
    builder: Arc<B>,
    stopping: Arc<Stopping>,
    progress: Arc<SharedProgress>,
    guard_init_env: Arc<Mutex<()>>,
    sender: Sender<WorkerMessage>,
}

impl<B: AgentBuilder> Worker<B> {
    pub(crate) fn new(
        id: usize,
        builder: Arc<B>,
        stopping: Arc<Stopping>,
        progress: Arc<SharedProgress>,
        guard_init_env: Arc<Mutex<()>>,
        sender: Sender<WorkerMessage>,
    ) -> Self {
        Self {
            id,
            builder,
            stopping,
            progress,
            guard_init_env,
            sender,
        }
    }

    /// Runs the episode loop and reports its outcome to the trainer.
    pub(crate) fn run(self) -> Result<WorkerStat> {
        match self.run_episodes() {
            Ok(stat) => {
                self.sender.send(WorkerMessage::Finished(stat.clone())).ok();
                Ok(stat)
            }
            Err(e) => {
                error!("Worker {} failed: {:#}", self.id, e);
                self.sender
                    .send(WorkerMessage::Failed {
                        worker_id: self.id,
                        error: format!("{:#}", e),
                    })
                    .ok();
                Err(e)
            }
        }
    }

    fn run_episodes(&self) -> Result<WorkerStat> {
        // Agents are built one at a time
        let mut agent = {
            let _guard = self
                .guard_init_env
                .lock()
                .map_err(|_| TrainingError::LockPoisoned("agent construction".to_string()))?;
            self.builder.build(self.id)?
        };
        info!("Worker {} started", self.id);

        let time = Instant::now();
        let mut episodes = 0;
        let mut env_steps = 0;

        while !self.progress.is_stopped() {
            let stat = agent.run()?;
            episodes += 1;
            env_steps += stat.steps;

            let (progress, stop) = self
                .progress
                .record_episode(stat.steps, self.stopping.as_ref())?;
            let stop = stop || stat.stop_requested;
            self.sender.send(WorkerMessage::Episode {
                worker_id: self.id,
                episode: progress.episode_count,
                stat,
            })?;

            if stop {
                self.progress.request_stop();
                break;
            }
        }

        info!("Worker {} stopped after {} episodes", self.id, episodes);
        Ok(WorkerStat {
            worker_id: self.id,
            episodes,
            env_steps,
            duration: time.elapsed(),
        })
    }
}
