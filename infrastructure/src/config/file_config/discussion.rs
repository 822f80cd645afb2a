use serde::{Deserialize, Serialize};
use std::time::Duration;
use taskforce_application::{DiscussionParams, RetryPolicy};

/// `[discussion]`: round loop, retry and repair settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDiscussionConfig {
    pub rounds: usize,
    /// Transcript turns shown to an agent per call.
    pub history_window: usize,
    /// Total attempts per inference call, the first one included.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
    /// Repair cycles for a malformed coordinator reply.
    pub repair_attempts: usize,
    pub show_thinking: bool,
    pub streaming: bool,
    /// Hide same-round turns of peers from each agent.
    pub isolate_rounds: bool,
    /// Ask the coordinator for a final answer after deciding.
    pub final_response: bool,
}

impl Default for FileDiscussionConfig {
    fn default() -> Self {
        Self {
            rounds: 3,
            history_window: 5,
            max_attempts: 3,
            initial_backoff_ms: 500,
            backoff_multiplier: 2.0,
            max_backoff_ms: 10_000,
            repair_attempts: 2,
            show_thinking: false,
            streaming: true,
            isolate_rounds: false,
            final_response: true,
        }
    }
}

impl FileDiscussionConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            multiplier: self.backoff_multiplier,
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }

    pub fn to_discussion_params(&self, request_timeout: Duration) -> DiscussionParams {
        DiscussionParams::default()
            .with_rounds(self.rounds)
            .with_history_window(self.history_window)
            .with_request_timeout(request_timeout)
            .with_retry(self.retry_policy())
            .with_repair_attempts(self.repair_attempts)
            .with_streaming(self.streaming)
            .with_isolated_rounds(self.isolate_rounds)
            .with_final_response(self.final_response)
    }
}
