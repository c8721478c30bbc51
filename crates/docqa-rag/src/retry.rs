use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use docqa_core::config::RetrySettings;
use docqa_core::{Error, Result};

/// Exponential backoff for gateway calls.
///
/// Every attempt runs under `call_timeout`; an attempt that times out counts
/// as a transient failure. Only transient errors (see [`Error::is_transient`])
/// are retried, up to `max_attempts` attempts in total.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
    call_timeout: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration, call_timeout: Duration) -> Result<Self> {
        if max_attempts == 0 {
            return Err(Error::InvalidConfig("retry max_attempts must be greater than 0".into()));
        }
        if max_backoff < initial_backoff {
            return Err(Error::InvalidConfig("retry max_backoff must be >= initial_backoff".into()));
        }
        if call_timeout.is_zero() {
            return Err(Error::InvalidConfig("retry call_timeout must be greater than 0".into()));
        }
        Ok(Self { max_attempts, initial_backoff, max_backoff, call_timeout })
    }

    pub fn from_settings(settings: &RetrySettings) -> Result<Self> {
        Self::new(
            settings.max_attempts,
            Duration::from_millis(settings.initial_backoff_ms),
            Duration::from_millis(settings.max_backoff_ms),
            Duration::from_secs(settings.call_timeout_secs),
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Runs `operation` until it succeeds, fails permanently or the attempts
    /// run out. The last error is returned unchanged.
    pub async fn execute<F, Fut, T>(&self, label: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = match timeout(self.call_timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(Error::unavailable(format!("{} timed out after {:?}", label, self.call_timeout), true)),
            };
            match outcome {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(label, attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let backoff = self.calculate_backoff(attempt - 1);
                    warn!(label, attempt, max_attempts = self.max_attempts, ?backoff, error = %err, "transient failure, retrying");
                    sleep(backoff).await;
                }
                Err(err) => {
                    if err.is_transient() {
                        warn!(label, attempts = attempt, error = %err, "giving up");
                    } else {
                        debug!(label, error = %err, "permanent error, not retrying");
                    }
                    return Err(err);
                }
            }
        }
    }

    /// `min(initial_backoff * 2^retry, max_backoff)`, `retry` counted from 0.
    fn calculate_backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry);
        self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
    }
}
