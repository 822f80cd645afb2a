//! Bounded retry with exponential backoff.
//!
//! A call reports one of three outcomes; only `Retryable` is attempted
//! again, and never more than `max_attempts` times in total.

use crate::ports::llm_gateway::GatewayError;
use crate::use_cases::shared::is_cancelled;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Retry schedule for inference calls.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            multiplier: 2.0,
            max_backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after the `failed_attempt`-th attempt (1-based) failed.
    pub fn backoff_for(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1) as i32;
        let millis = self.initial_backoff.as_millis() as f64 * self.multiplier.max(1.0).powi(exponent);
        Duration::from_millis(millis.min(self.max_backoff.as_millis() as f64) as u64)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Result of a single attempt.
#[derive(Debug)]
pub enum CallOutcome<T> {
    Success(T),
    Retryable(GatewayError),
    Terminal(GatewayError),
}

impl<T> From<Result<T, GatewayError>> for CallOutcome<T> {
    fn from(result: Result<T, GatewayError>) -> Self {
        match result {
            Ok(value) => CallOutcome::Success(value),
            Err(e) if e.is_transient() => CallOutcome::Retryable(e),
            Err(e) => CallOutcome::Terminal(e),
        }
    }
}

/// Why a retried call gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryFailure {
    Exhausted { attempts: u32, last: GatewayError },
    Terminal { attempts: u32, error: GatewayError },
    Cancelled,
}

/// Run `call` until it succeeds, fails terminally, runs out of attempts or
/// the token is cancelled.
///
/// A result that arrives after cancellation is discarded. `on_retry` is
/// invoked before each backoff sleep with the failed attempt number.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancellation: &Option<CancellationToken>,
    mut on_retry: impl FnMut(u32, &GatewayError),
    mut call: F,
) -> Result<T, RetryFailure>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = CallOutcome<T>>,
{
    let max_attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;
        if is_cancelled(cancellation) {
            return Err(RetryFailure::Cancelled);
        }

        let outcome = call(attempt).await;
        if is_cancelled(cancellation) {
            return Err(RetryFailure::Cancelled);
        }

        let error = match outcome {
            CallOutcome::Success(value) => return Ok(value),
            CallOutcome::Terminal(error) => {
                return Err(RetryFailure::Terminal {
                    attempts: attempt,
                    error,
                });
            }
            CallOutcome::Retryable(error) => error,
        };

        if attempt >= max_attempts {
            return Err(RetryFailure::Exhausted {
                attempts: attempt,
                last: error,
            });
        }

        let delay = policy.backoff_for(attempt);
        warn!(
            "Attempt {}/{} failed: {}; retrying in {:?}",
            attempt, max_attempts, error, delay
        );
        on_retry(attempt, &error);

        match cancellation {
            Some(token) => {
                tokio::select! {
                    _ = token.cancelled() => return Err(RetryFailure::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            None => tokio::time::sleep(delay).await,
        }
    }
}
