// Common test utilities shared by the integration suites

pub mod builders;

use resilient_post::{BackoffConfig, Logger, MemorySink, PostClient, RetryLoop};
use std::sync::Arc;
use std::time::Duration;

/// Millisecond-scale policy so real-clock tests finish quickly
pub fn fast_backoff(max_elapsed: Duration) -> BackoffConfig {
    BackoffConfig {
        initial_interval: Duration::from_millis(10),
        multiplier: 2.0,
        randomization_factor: 0.5,
        max_interval: Duration::from_millis(40),
        max_elapsed_time: max_elapsed,
    }
}

/// Client and retry loop sharing one in-memory log sink
pub struct Harness {
    pub client: PostClient,
    pub retry: RetryLoop,
    pub sink: MemorySink,
}

impl Harness {
    pub fn new(backoff: BackoffConfig, request_timeout: Duration, deadline: Duration) -> Self {
        let sink = MemorySink::new();
        let logger = Logger::new(Arc::new(sink.clone()));

        Self {
            client: PostClient::new(request_timeout, logger.clone()).expect("client builds"),
            retry: RetryLoop::new(backoff, deadline, logger).expect("valid policy"),
            sink,
        }
    }

    pub fn count(&self, needle: &str) -> usize {
        self.sink.lines().iter().filter(|l| l.contains(needle)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fast_backoff_is_valid() {
        assert!(fast_backoff(Duration::from_secs(1)).validate().is_ok());
    }
}
