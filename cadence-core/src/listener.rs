//! Hooks observing a learning agent.
use crate::{error::TrainingError, EpisodeStat, Observation, Step};
use anyhow::Result;
use log::error;

/// Answer of a listener hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerResponse {
    /// Keep going.
    Continue,

    /// Stop training once the current episode has been wrapped up.
    Stop,
}

/// Observes the episodes played by a [`LearningAgent`](crate::LearningAgent).
///
/// All hooks default to [`ListenerResponse::Continue`]. A failing hook aborts the
/// episode before the experience of the current step is recorded.
pub trait AgentListener<A> {
    /// Called before the environment is reset.
    fn on_before_episode(&mut self) -> Result<ListenerResponse> {
        Ok(ListenerResponse::Continue)
    }

    /// Called before an action is selected for `obs`.
    fn on_before_step(&mut self, _obs: &Observation) -> Result<ListenerResponse> {
        Ok(ListenerResponse::Continue)
    }

    /// Called after the environment has been stepped.
    fn on_after_step(&mut self, _action: &A, _step: &Step) -> Result<ListenerResponse> {
        Ok(ListenerResponse::Continue)
    }

    /// Called once the episode has ended.
    fn on_after_episode(&mut self, _stat: &EpisodeStat) -> Result<ListenerResponse> {
        Ok(ListenerResponse::Continue)
    }
}

/// Calls `f` on every listener and merges the responses.
///
/// Every listener is called even if an earlier one asks to stop.
pub(crate) fn notify<A>(
    listeners: &mut [Box<dyn AgentListener<A>>],
    mut f: impl FnMut(&mut dyn AgentListener<A>) -> Result<ListenerResponse>,
) -> Result<ListenerResponse> {
    let mut response = ListenerResponse::Continue;
    for listener in listeners.iter_mut() {
        match f(listener.as_mut()) {
            Ok(ListenerResponse::Stop) => response = ListenerResponse::Stop,
            Ok(ListenerResponse::Continue) => {}
            Err(e) => {
                error!("Listener failed: {}", e);
                return Err(TrainingError::ListenerFailed(e.to_string()).into());
            }
        }
    }
    Ok(response)
}

#[cfg(test)]
mod test {
    use super::*;

    struct StopAfter(usize);

    impl AgentListener<usize> for StopAfter {
        fn on_before_step(&mut self, _obs: &Observation) -> Result<ListenerResponse> {
            if self.0 == 0 {
                Ok(ListenerResponse::Stop)
            } else {
                self.0 -= 1;
                Ok(ListenerResponse::Continue)
            }
        }
    }

    struct Failing;

    impl AgentListener<usize> for Failing {
        fn on_before_episode(&mut self) -> Result<ListenerResponse> {
            Err(anyhow::anyhow!("broken"))
        }
    }

    #[test]
    fn test_notify() {
        let obs = Observation::from_vec("state", vec![0.0]);
        let mut listeners: Vec<Box<dyn AgentListener<usize>>> =
            vec![Box::new(StopAfter(1)), Box::new(StopAfter(5))];
        let r = notify(&mut listeners, |l| l.on_before_step(&obs)).unwrap();
        assert_eq!(r, ListenerResponse::Continue);
        let r = notify(&mut listeners, |l| l.on_before_step(&obs)).unwrap();
        assert_eq!(r, ListenerResponse::Stop);

        let mut listeners: Vec<Box<dyn AgentListener<usize>>> = vec![Box::new(Failing)];
        let err = notify(&mut listeners, |l| l.on_before_episode()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<TrainingError>(),
            Some(&TrainingError::ListenerFailed("broken".to_string()))
        );
    }
}
