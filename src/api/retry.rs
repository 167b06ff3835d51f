use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout_at};

use super::backoff::{BackoffStep, ExponentialBackoff};
use crate::config::{BackoffConfig, MAX_DEADLINE_SECS};
use crate::error::{PostError, Result};
use crate::logger::Logger;

/// Drives sequential attempts through the backoff policy under one overall deadline.
///
/// Each attempt and each backoff sleep races against the deadline; whichever
/// fires first wins. Only [`PostError::is_retryable`] failures are retried.
#[derive(Debug)]
pub struct RetryLoop {
    backoff: BackoffConfig,
    deadline: Duration,
    logger: Logger,
}

impl RetryLoop {
    pub fn new(backoff: BackoffConfig, deadline: Duration, logger: Logger) -> Result<Self> {
        backoff.validate()?;
        if deadline.is_zero() || deadline > Duration::from_secs(MAX_DEADLINE_SECS) {
            return Err(PostError::InvalidConfig(format!(
                "deadline must be within (0, {}s], got {:?}",
                MAX_DEADLINE_SECS, deadline
            )));
        }

        Ok(Self {
            backoff,
            deadline,
            logger,
        })
    }

    /// Runs `operation` until it succeeds, fails terminally, the policy gives
    /// up, or the deadline passes. The closure receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let Some(deadline) = Instant::now().checked_add(self.deadline) else {
            return Err(PostError::InvalidConfig(format!(
                "deadline {:?} overflows the clock",
                self.deadline
            )));
        };
        let mut backoff = ExponentialBackoff::new(self.backoff.clone());
        backoff.reset();
        let mut attempt: u32 = 0;

        loop {
            if Instant::now() >= deadline {
                return Err(self.deadline_exceeded(attempt));
            }

            attempt += 1;
            log::info!("attempting operation {}", attempt);
            self.logger.debug(format_args!("attempting operation {}", attempt));

            let err = match timeout_at(deadline, operation(attempt)).await {
                Err(_) => return Err(self.deadline_exceeded(attempt)),
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if !e.is_retryable() => {
                    self.logger.error(format_args!("Final error: {}", e));
                    return Err(e);
                }
                Ok(Err(e)) => e,
            };

            let wait = match backoff.next() {
                BackoffStep::Wait(wait) => wait,
                BackoffStep::Stop => {
                    let exhausted = PostError::PolicyExhausted {
                        attempts: attempt,
                        source: Box::new(err),
                    };
                    self.logger.error(format_args!("Final error: {}", exhausted));
                    return Err(exhausted);
                }
            };

            self.logger
                .warn(format_args!("Error: {}, backing off for {:?}", err, wait));

            if timeout_at(deadline, sleep(wait)).await.is_err() {
                return Err(self.deadline_exceeded(attempt));
            }
        }
    }

    fn deadline_exceeded(&self, attempts: u32) -> PostError {
        let err = PostError::DeadlineExceeded {
            attempts,
            deadline: self.deadline,
        };
        self.logger
            .error(format_args!("Context deadline exceeded: {}", err));
        err
    }
}
