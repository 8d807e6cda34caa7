//! Retry policy for transport-level failures.

use crate::errors::RetryableError;
use backon::{ExponentialBuilder, Retryable};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::{error, warn};

/// Callback invoked before each retry with the failure and the upcoming wait.
pub type OnRetryCallback<E> = Arc<dyn Fn(&E, Duration) + Send + Sync>;

/// Configuration for retry behavior.
///
/// `max_attempts` counts every attempt, the first one included. Between
/// attempts the policy waits `delay * 2^(attempt - 1)` with exponential
/// backoff enabled, or a flat `delay` otherwise, never more than `max_delay`.
///
/// ```rust
/// use haozhu::RetryConfig;
/// use std::time::Duration;
///
/// let config = RetryConfig::default()
///     .with_max_attempts(5)
///     .with_delay(Duration::from_millis(500))
///     .with_exponential_backoff(false);
///
/// assert_eq!(config.max_attempts, 5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total number of attempts, including the first (default: 3).
    pub max_attempts: usize,
    /// Base delay between attempts (default: 1 second).
    pub delay: Duration,
    /// Double the delay after every failed attempt (default: true).
    pub exponential_backoff: bool,
    /// Upper bound for a single wait (default: 60 seconds).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
            exponential_backoff: true,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Set the total number of attempts.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the base delay between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Enable or disable exponential backoff.
    pub fn with_exponential_backoff(mut self, enabled: bool) -> Self {
        self.exponential_backoff = enabled;
        self
    }

    /// Set the upper bound for a single wait.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// A configuration that never retries.
    pub fn disabled() -> Self {
        Self::default().with_max_attempts(1)
    }

    /// Build a backoff strategy from this configuration.
    ///
    /// A flat delay is an exponential schedule with factor 1.
    pub fn build_strategy(&self) -> ExponentialBuilder {
        let factor = if self.exponential_backoff { 2.0 } else { 1.0 };
        ExponentialBuilder::default()
            .with_min_delay(self.delay)
            .with_max_delay(self.max_delay.max(self.delay))
            .with_factor(factor)
            .with_max_times(self.max_attempts.max(1) - 1)
    }
}

/// Run `operation` under the retry policy described by `config`.
///
/// Only errors whose [`RetryableError::is_retryable`] returns true are
/// retried; anything else is returned after the attempt that produced it.
/// When every attempt fails, the error of the last attempt is returned
/// unchanged.
pub async fn retry<T, E, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    on_retry: Option<&OnRetryCallback<E>>,
    f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError + Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0usize;

    let result = f
        .retry(config.build_strategy())
        .when(|err: &E| err.is_retryable())
        .notify(|err: &E, wait: Duration| {
            attempt += 1;

            if let Some(callback) = on_retry {
                callback(err, wait);
            }

            #[cfg(feature = "tracing")]
            warn!(
                operation = %operation,
                attempt = attempt,
                max_attempts = max_attempts,
                retry_after_secs = wait.as_secs_f64(),
                error = %err,
                "Request failed, retrying"
            );
            #[cfg(not(feature = "tracing"))]
            let _ = (err, wait, operation, attempt, max_attempts);
        })
        .await;

    #[cfg(feature = "tracing")]
    match &result {
        Err(err) if err.is_retryable() => error!(
            operation = %operation,
            attempts = max_attempts,
            error = %err,
            "Request failed, retry attempts exhausted"
        ),
        _ => {}
    }

    result
}
