//! Discussion parameters: orchestration loop control.
//!
//! [`DiscussionParams`] groups the static parameters that control
//! [`RunDiscussionUseCase`](crate::use_cases::run_discussion::RunDiscussionUseCase):
//! round count, context window, retry and repair bounds, and streaming.

use crate::use_cases::retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Orchestration loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionParams {
    /// Number of rounds to run.
    pub rounds: usize,
    /// Turns of history sent to the model per call.
    pub history_window: usize,
    /// Per-request timeout for inference calls.
    pub request_timeout: Duration,
    /// Retry schedule for transient inference failures.
    pub retry: RetryPolicy,
    /// Repair cycles for a structured reply before it degrades to raw text.
    pub repair_attempts: usize,
    /// Deliver public turns token by token.
    pub streaming: bool,
    /// Agents only see turns from earlier rounds, not same-round peers.
    pub isolate_rounds: bool,
    /// Ask the coordinator for a final answer to the topic after DECIDING.
    pub final_response: bool,
}

impl Default for DiscussionParams {
    fn default() -> Self {
        Self {
            rounds: 3,
            history_window: 5,
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            repair_attempts: 2,
            streaming: true,
            isolate_rounds: false,
            final_response: true,
        }
    }
}

impl DiscussionParams {
    // ==================== Builder Methods ====================

    pub fn with_rounds(mut self, rounds: usize) -> Self {
        self.rounds = rounds;
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_repair_attempts(mut self, attempts: usize) -> Self {
        self.repair_attempts = attempts;
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn with_isolated_rounds(mut self, isolate: bool) -> Self {
        self.isolate_rounds = isolate;
        self
    }

    pub fn with_final_response(mut self, enabled: bool) -> Self {
        self.final_response = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = DiscussionParams::default();
        assert_eq!(params.rounds, 3);
        assert_eq!(params.history_window, 5);
        assert_eq!(params.repair_attempts, 2);
        assert_eq!(params.retry.max_attempts, 3);
        assert_eq!(params.request_timeout, Duration::from_secs(30));
        assert!(params.streaming);
        assert!(!params.isolate_rounds);
    }

    #[test]
    fn test_builder() {
        let params = DiscussionParams::default()
            .with_rounds(5)
            .with_history_window(2)
            .with_streaming(false)
            .with_retry(RetryPolicy::no_retry());

        assert_eq!(params.rounds, 5);
        assert_eq!(params.history_window, 2);
        assert!(!params.streaming);
        assert_eq!(params.retry.max_attempts, 1);
    }
}
