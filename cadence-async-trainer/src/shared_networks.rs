//! Global and target networks shared by asynchronous workers.
use anyhow::Result;
use cadence_core::{
    ensure_config, error::TrainingError, ConfigFile, NetOutputs, NeuralNet, Observation,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

/// Configuration of [`SharedNetworks`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SharedNetworksConfig {
    /// Number of applied gradients between target network refreshes.
    pub target_update_frequency: usize,
}

impl Default for SharedNetworksConfig {
    fn default() -> Self {
        Self {
            target_update_frequency: 100,
        }
    }
}

impl SharedNetworksConfig {
    /// Sets the target refresh interval.
    pub fn target_update_frequency(mut self, v: usize) -> Self {
        self.target_update_frequency = v;
        self
    }

    /// Checks the refresh interval is positive.
    pub fn validate(&self) -> Result<()> {
        ensure_config(
            self.target_update_frequency >= 1,
            "target_update_frequency must be at least 1",
        )
    }
}

impl ConfigFile for SharedNetworksConfig {}

struct GlobalState<N> {
    network: N,
    n_updates: usize,
}

/// Owner of the global network and its target snapshot.
///
/// Gradients are applied by one writer at a time under the lock of the global
/// network. The target is replaced as a whole while that lock is held, so readers of
/// the target never observe a partially copied network. Locks are always taken in
/// the order global, then target.
pub struct SharedNetworks<N> {
    global: Mutex<GlobalState<N>>,
    target: Mutex<N>,
    target_update_frequency: usize,
}

fn lock<'a, T>(m: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>> {
    m.lock()
        .map_err(|_| TrainingError::LockPoisoned(name.to_string()).into())
}

impl<N: NeuralNet> SharedNetworks<N> {
    /// Constructs the shared networks, the target starting as a copy of `network`.
    pub fn build(network: N, config: &SharedNetworksConfig) -> Result<Self> {
        config.validate()?;
        let target = network.clone();
        Ok(Self {
            global: Mutex::new(GlobalState {
                network,
                n_updates: 0,
            }),
            target: Mutex::new(target),
            target_update_frequency: config.target_update_frequency,
        })
    }

    /// Applies gradients to the global network and returns the number of applications.
    ///
    /// The target network is refreshed every `target_update_frequency` applications.
    pub fn apply_gradients(&self, gradients: &N::Gradients, batch_size: usize) -> Result<usize> {
        let mut global = lock(&self.global, "global network")?;
        global.network.apply_gradients(gradients, batch_size)?;
        global.n_updates += 1;
        if global.n_updates % self.target_update_frequency == 0 {
            let mut target = lock(&self.target, "target network")?;
            target.copy_from(&global.network);
            debug!("Updated target network at update {}", global.n_updates);
        }
        Ok(global.n_updates)
    }

    /// Copies the parameters of the global network into `dst`.
    pub fn copy_global_to(&self, dst: &mut N) -> Result<()> {
        let global = lock(&self.global, "global network")?;
        dst.copy_from(&global.network);
        Ok(())
    }

    /// Returns a clone of the global network.
    pub fn clone_global(&self) -> Result<N> {
        Ok(lock(&self.global, "global network")?.network.clone())
    }

    /// Forward pass of the target network.
    pub fn target_output(&self, obs: &Observation) -> Result<NetOutputs> {
        lock(&self.target, "target network")?.output(obs)
    }

    /// Number of gradient applications so far.
    pub fn n_updates(&self) -> Result<usize> {
        Ok(lock(&self.global, "global network")?.n_updates)
    }

    /// Calls `f` with the global network under its lock.
    pub fn with_global<T>(&self, f: impl FnOnce(&N) -> T) -> Result<T> {
        let global = lock(&self.global, "global network")?;
        Ok(f(&global.network))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use cadence_core::{dummy::DummyNet, Q_VALUES};
    use std::{sync::Arc, thread};

    #[test]
    fn test_concurrent_applications() -> Result<()> {
        let config = SharedNetworksConfig::default().target_update_frequency(10);
        let shared = Arc::new(SharedNetworks::build(
            DummyNet::with_q_values(vec![0.0]),
            &config,
        )?);
        let handles = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || -> Result<()> {
                    for _ in 0..25 {
                        shared.apply_gradients(&1.0, 1)?;
                    }
                    Ok(())
                })
            })
            .collect::<Vec<_>>();
        for h in handles {
            h.join().expect("worker panicked")?;
        }

        assert_eq!(shared.n_updates()?, 100);
        assert_eq!(shared.with_global(|n| n.bias())?, 100.0);
        assert_eq!(shared.with_global(|n| n.n_gradient_applications())?, 100);
        let obs = Observation::from_vec("state", vec![0.0]);
        assert_eq!(shared.target_output(&obs)?.max(Q_VALUES)?, 100.0);
        Ok(())
    }

    #[test]
    fn test_target_cadence() -> Result<()> {
        let config = SharedNetworksConfig::default().target_update_frequency(3);
        let shared = SharedNetworks::build(DummyNet::with_q_values(vec![0.0]), &config)?;
        let obs = Observation::from_vec("state", vec![0.0]);
        shared.apply_gradients(&1.0, 1)?;
        shared.apply_gradients(&1.0, 1)?;
        assert_eq!(shared.target_output(&obs)?.max(Q_VALUES)?, 0.0);
        shared.apply_gradients(&1.0, 1)?;
        assert_eq!(shared.target_output(&obs)?.max(Q_VALUES)?, 3.0);

        let mut local = DummyNet::with_q_values(vec![0.0]);
        shared.copy_global_to(&mut local)?;
        assert_eq!(local.bias(), 3.0);

        let e = SharedNetworks::build(
            DummyNet::with_q_values(vec![0.0]),
            &SharedNetworksConfig::default().target_update_frequency(0),
        )
        .err()
        .unwrap();
        assert!(matches!(
            e.downcast_ref::<TrainingError>(),
            Some(TrainingError::InvalidConfig(_))
        ));
        Ok(())
    }
}
