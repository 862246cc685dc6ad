//! Synchronous trainer.
mod config;
use crate::{record::Recorder, AgentLearner};
use anyhow::Result;
pub use config::SyncTrainerConfig;
use log::info;

/// Counters shared by trainers and stopping predicates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrainingProgress {
    /// Number of finished episodes.
    pub episode_count: usize,

    /// Number of environment steps over all finished episodes.
    pub step_count: usize,
}

/// Builds a fresh agent for a worker.
///
/// Each call clones the networks handed to the builder, so agents built for different
/// workers do not share parameters unless the builder wires them to shared state.
pub trait AgentBuilder {
    /// Type of the built agents.
    type Agent: AgentLearner;

    /// Builds the agent of worker `worker_id`.
    fn build(&self, worker_id: usize) -> Result<Self::Agent>;

    /// Checks the configuration of the agents before any of them is built.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs episodes with a single agent until a stopping predicate holds.
///
/// ```mermaid
/// graph LR
///     Trainer -->|run| LearningAgent
///     LearningAgent -->|EpisodeStat| Trainer
///     Trainer -->|Record| Recorder
///     Trainer -->|TrainingProgress| Stopping[stopping predicate]
/// ```
///
/// The predicate is evaluated after every episode with the counters including that
/// episode. Training also stops when a listener of the agent asks for it.
pub struct SyncTrainer<L> {
    agent: L,
    stopping: Box<dyn Fn(&TrainingProgress) -> bool>,
    record_interval: usize,
    progress: TrainingProgress,
}

impl<L: AgentLearner> SyncTrainer<L> {
    /// Builds the agent of worker `0` with `builder` and constructs the trainer.
    pub fn build<B>(
        builder: &B,
        config: &SyncTrainerConfig,
        stopping: impl Fn(&TrainingProgress) -> bool + 'static,
    ) -> Result<Self>
    where
        B: AgentBuilder<Agent = L>,
    {
        config.validate()?;
        builder.validate()?;
        let agent = builder.build(0)?;
        Self::new(agent, config, stopping)
    }

    /// Constructs the trainer around an agent.
    pub fn new(
        agent: L,
        config: &SyncTrainerConfig,
        stopping: impl Fn(&TrainingProgress) -> bool + 'static,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            agent,
            stopping: Box::new(stopping),
            record_interval: config.record_interval,
            progress: TrainingProgress::default(),
        })
    }

    /// The agent.
    pub fn agent(&self) -> &L {
        &self.agent
    }

    /// Counters of the latest training run.
    pub fn progress(&self) -> TrainingProgress {
        self.progress
    }

    /// Trains the agent until the stopping predicate holds.
    ///
    /// Counters are reset at the start. An error of the agent stops training and is
    /// returned as is.
    pub fn train(&mut self, recorder: &mut dyn Recorder) -> Result<TrainingProgress> {
        self.progress = TrainingProgress::default();
        info!("Started training");

        loop {
            let stat = self.agent.run()?;
            self.progress.episode_count += 1;
            self.progress.step_count += stat.steps;

            if self.progress.episode_count % self.record_interval == 0 {
                recorder.write(stat.to_record(0, self.progress.episode_count));
                info!(
                    "Episode {}: steps = {}, reward = {}",
                    self.progress.episode_count, stat.steps, stat.reward
                );
            }

            if stat.stop_requested {
                info!("Stop requested by a listener");
                break;
            }
            if (self.stopping)(&self.progress) {
                break;
            }
        }

        info!(
            "Finished training: {} episodes, {} steps",
            self.progress.episode_count, self.progress.step_count
        );
        Ok(self.progress)
    }
}
