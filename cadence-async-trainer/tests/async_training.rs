use anyhow::{bail, Result};
use cadence_async_trainer::{
    A2cAgentBuilder, A2cAgentConfig, AsyncTrainer, AsyncTrainerConfig, NStepQAgentBuilder,
    NStepQAgentConfig, SharedNetworks, SharedNetworksConfig,
};
use cadence_core::{
    dummy::{DummyEnv, DummyEnvConfig, DummyNet},
    error::TrainingError,
    record::{BufferedRecorder, NullRecorder},
    AgentBuilder, AgentLearner, EpisodeStat,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use test_log::test;

#[test]
fn test_a2c_three_workers() -> Result<()> {
    let shared = Arc::new(SharedNetworks::build(
        DummyNet::with_actor_critic(0.0, vec![0.3, 0.7]),
        &SharedNetworksConfig::default().target_update_frequency(5),
    )?);
    let builder = A2cAgentBuilder::<DummyEnv, DummyNet>::new(
        DummyEnvConfig::default().steps_per_episode(10),
        shared.clone(),
        A2cAgentConfig::default(),
    );
    let config = AsyncTrainerConfig::default().num_threads(3);
    let mut trainer = AsyncTrainer::build(builder, &config, |p| p.episode_count >= 12)?;
    let mut recorder = BufferedRecorder::new();
    let stat = trainer.train(&mut recorder)?;
    println!("{}", stat.fmt());

    let episodes = stat.progress.episode_count;
    assert!(episodes >= 12);
    assert_eq!(stat.progress.step_count, episodes * 10);
    assert_eq!(trainer.progress(), stat.progress);
    assert_eq!(recorder.len(), episodes);

    assert_eq!(stat.worker_stats.len(), 3);
    assert_eq!(
        stat.worker_stats.iter().map(|s| s.episodes).sum::<usize>(),
        episodes
    );
    for (i, s) in stat.worker_stats.iter().enumerate() {
        assert_eq!(s.worker_id, i);
        assert_eq!(s.env_steps, s.episodes * 10);
    }

    // Two trajectories of five transitions per episode.
    assert_eq!(shared.n_updates()?, episodes * 2);
    Ok(())
}

#[test]
fn test_nstep_q_two_workers() -> Result<()> {
    let shared = Arc::new(SharedNetworks::build(
        DummyNet::with_q_values(vec![0.0, 0.5]),
        &SharedNetworksConfig::default(),
    )?);
    let mut agent_config = NStepQAgentConfig::default();
    agent_config.trajectory = agent_config.trajectory.batch_size(4);
    agent_config.eps_greedy = agent_config.eps_greedy.anneal_steps(50);
    let builder = NStepQAgentBuilder::<DummyEnv, DummyNet>::new(
        DummyEnvConfig::default().steps_per_episode(10),
        shared.clone(),
        agent_config,
    );
    let config = AsyncTrainerConfig::default()
        .num_threads(2)
        .record_interval(2);
    let mut trainer = AsyncTrainer::build(builder, &config, |p| p.step_count >= 60)?;
    let mut recorder = BufferedRecorder::new();
    let stat = trainer.train(&mut recorder)?;

    let episodes = stat.progress.episode_count;
    assert!(episodes >= 6);
    assert_eq!(recorder.len(), episodes / 2);
    // Trajectories of 4, 4 and 2 transitions per episode.
    assert_eq!(shared.n_updates()?, episodes * 3);
    assert_eq!(trainer.builder().shared().n_updates()?, episodes * 3);
    Ok(())
}

struct FixedAgent {
    steps: usize,
    panics: bool,
    n_runs: usize,
    stop_after: Option<usize>,
}

impl AgentLearner for FixedAgent {
    fn run(&mut self) -> Result<EpisodeStat> {
        if self.panics {
            panic!("agent panicked");
        }
        self.n_runs += 1;
        Ok(EpisodeStat {
            steps: self.steps,
            reward: 0.0,
            stop_requested: self.stop_after.map_or(false, |n| self.n_runs >= n),
        })
    }
}

#[derive(Default)]
struct FixedBuilder {
    n_builds: AtomicUsize,
    failing_worker: Option<usize>,
    panicking_worker: Option<usize>,
    stop_after: Option<usize>,
}

impl AgentBuilder for FixedBuilder {
    type Agent = FixedAgent;

    fn build(&self, worker_id: usize) -> Result<FixedAgent> {
        self.n_builds.fetch_add(1, Ordering::SeqCst);
        if self.failing_worker == Some(worker_id) {
            bail!("failed to build the agent of worker {}", worker_id);
        }
        Ok(FixedAgent {
            steps: 3,
            panics: self.panicking_worker == Some(worker_id),
            n_runs: 0,
            stop_after: self.stop_after,
        })
    }
}

#[test]
fn test_zero_threads_fails_at_construction() {
    let config = AsyncTrainerConfig::default().num_threads(0);
    let result = AsyncTrainer::build(FixedBuilder::default(), &config, |_| true);
    let e = result.err().unwrap();
    assert!(matches!(
        e.downcast_ref::<TrainingError>(),
        Some(TrainingError::InvalidConfig(_))
    ));
}

#[test]
fn test_invalid_agent_config_fails_at_construction() -> Result<()> {
    let shared = Arc::new(SharedNetworks::build(
        DummyNet::with_q_values(vec![0.0, 0.5]),
        &SharedNetworksConfig::default(),
    )?);
    let mut agent_config = NStepQAgentConfig::default();
    agent_config.nstep = agent_config.nstep.gamma(2.0);
    let builder = NStepQAgentBuilder::<DummyEnv, DummyNet>::new(
        DummyEnvConfig::default(),
        shared.clone(),
        agent_config,
    );
    let config = AsyncTrainerConfig::default().num_threads(2);
    let e = AsyncTrainer::build(builder, &config, |_| true).err().unwrap();

    assert!(matches!(
        e.downcast_ref::<TrainingError>(),
        Some(TrainingError::InvalidConfig(_))
    ));
    // No worker trained.
    assert_eq!(shared.n_updates()?, 0);
    Ok(())
}

#[test]
fn test_builds_one_agent_per_worker() -> Result<()> {
    let config = AsyncTrainerConfig::default().num_threads(4);
    let mut trainer = AsyncTrainer::build(FixedBuilder::default(), &config, |p| {
        p.episode_count >= 20
    })?;
    let stat = trainer.train(&mut NullRecorder::new())?;
    assert_eq!(trainer.builder().n_builds.load(Ordering::SeqCst), 4);
    assert!(stat.progress.episode_count >= 20);
    assert_eq!(stat.progress.step_count, stat.progress.episode_count * 3);
    Ok(())
}

#[test]
fn test_failed_worker_does_not_stop_others() {
    let builder = FixedBuilder {
        failing_worker: Some(1),
        ..FixedBuilder::default()
    };
    let config = AsyncTrainerConfig::default().num_threads(2);
    let mut trainer = AsyncTrainer::build(builder, &config, |p| p.episode_count >= 10).unwrap();
    let result = trainer.train(&mut NullRecorder::new());

    assert!(result.is_err());
    // Worker 0 kept training until the predicate held.
    assert!(trainer.progress().episode_count >= 10);
}

#[test]
fn test_panicked_worker_is_reported() {
    let builder = FixedBuilder {
        panicking_worker: Some(0),
        ..FixedBuilder::default()
    };
    let config = AsyncTrainerConfig::default().num_threads(2);
    let mut trainer = AsyncTrainer::build(builder, &config, |p| p.episode_count >= 5).unwrap();
    let e = trainer.train(&mut NullRecorder::new()).err().unwrap();

    assert_eq!(
        e.downcast_ref::<TrainingError>(),
        Some(&TrainingError::WorkerPanicked(0))
    );
    assert!(trainer.progress().episode_count >= 5);
}

#[test]
fn test_stop_requested_by_agent() -> Result<()> {
    let builder = FixedBuilder {
        stop_after: Some(3),
        ..FixedBuilder::default()
    };
    let config = AsyncTrainerConfig::default().num_threads(1);
    let mut trainer = AsyncTrainer::build(builder, &config, |_| false)?;
    let stat = trainer.train(&mut NullRecorder::new())?;
    assert_eq!(stat.progress.episode_count, 3);
    assert_eq!(stat.progress.step_count, 9);
    Ok(())
}
