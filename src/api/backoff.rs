use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::BackoffConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffStep {
    /// Sleep this long, then try again
    Wait(Duration),
    /// Elapsed-time budget consumed
    Stop,
}

/// Randomized exponential backoff.
///
/// Each `next()` yields `min(current * (1 ± randomization_factor), max_interval)`
/// and then grows `current` by `multiplier` (capped at `max_interval`). Once the
/// time since the last `reset()` reaches `max_elapsed_time` it yields `Stop`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    config: BackoffConfig,
    current_interval: Duration,
    started_at: Instant,
    attempts: u32,
}

impl ExponentialBackoff {
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            current_interval: config.initial_interval,
            started_at: Instant::now(),
            attempts: 0,
            config,
        }
    }

    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    /// Number of waits handed out since the last reset
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Never negative, even if the clock reads earlier than `started_at`.
    pub fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.started_at)
    }

    pub fn reset(&mut self) {
        self.current_interval = self.config.initial_interval;
        self.started_at = Instant::now();
        self.attempts = 0;
    }

    pub fn next(&mut self) -> BackoffStep {
        self.next_with(&mut rand::thread_rng())
    }

    pub fn next_with<R: Rng>(&mut self, rng: &mut R) -> BackoffStep {
        if self.elapsed() >= self.config.max_elapsed_time {
            return BackoffStep::Stop;
        }

        let wait = randomized_interval(
            self.current_interval,
            self.config.randomization_factor,
            rng.r#gen::<f64>(),
        )
        .min(self.config.max_interval);

        self.increment_interval();
        self.attempts += 1;

        BackoffStep::Wait(wait)
    }

    fn increment_interval(&mut self) {
        let grown = self.current_interval.as_secs_f64() * self.config.multiplier;
        let max = self.config.max_interval.as_secs_f64();

        self.current_interval = if grown >= max {
            self.config.max_interval
        } else {
            Duration::from_secs_f64(grown)
        };
    }
}

/// Picks a point in `[interval - delta, interval + delta]` where
/// `delta = factor * interval` and `random` is in `[0, 1)`.
fn randomized_interval(interval: Duration, factor: f64, random: f64) -> Duration {
    let base = interval.as_secs_f64();
    let delta = factor * base;
    let min = base - delta;
    let max = base + delta;

    Duration::from_secs_f64((min + random * (max - min)).max(0.0))
}
