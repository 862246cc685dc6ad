use std::time::Duration;

/// Stats of a worker over a training run.
#[derive(Clone, Debug)]
pub struct WorkerStat {
    /// Id of the worker.
    pub worker_id: usize,

    /// The number of episodes played by the worker.
    pub episodes: usize,

    /// The number of steps for interaction between agent and env.
    pub env_steps: usize,

    /// Duration of the episode loop of the worker.
    pub duration: Duration,
}

/// Returns a formatted string of the set of [WorkerStat] for reporting.
pub fn worker_stats_fmt(stats: &[WorkerStat]) -> String {
    let mut s = "worker id, episodes, steps, duration [sec], steps per sec\n".to_string();
    for stat in stats.iter() {
        let n = stat.env_steps;
        let d = stat.duration.as_secs_f32();
        let p = if d > 0.0 { (n as f32) / d } else { 0.0 };
        s += format!("{}, {}, {}, {}, {}\n", stat.worker_id, stat.episodes, n, d, p).as_str();
    }
    s
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_worker_stats_fmt() {
        let stats = vec![
            WorkerStat {
                worker_id: 0,
                episodes: 3,
                env_steps: 30,
                duration: Duration::from_secs(2),
            },
            WorkerStat {
                worker_id: 1,
                episodes: 1,
                env_steps: 10,
                duration: Duration::from_secs(0),
            },
        ];
        let s = worker_stats_fmt(&stats);
        let lines = s.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "0, 3, 30, 2, 15");
        assert_eq!(lines[2], "1, 1, 10, 0, 0");
    }
}
