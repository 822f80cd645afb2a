//! Progress notification port
//!
//! Lifecycle hooks the orchestrator calls while a discussion runs. Every
//! method has a no-op default so presenters implement only what they show.

use crate::ports::llm_gateway::GatewayError;
use taskforce_domain::{
    CoordinatorPhase, KnowledgeNote, SchemaIssue, SessionSnapshot, Turn, TurnPlaceholder,
};

/// Callback for progress updates during a discussion
///
/// Implementations live in the presentation layer. Snapshots are detached
/// copies; holding on to them is safe.
pub trait ProgressNotifier: Send + Sync {
    /// Called once before the first coordinator phase or turn.
    fn on_session_start(&self, _snapshot: &SessionSnapshot) {}

    /// Called when a round starts (0-indexed).
    fn on_round_start(&self, _round: usize, _total_rounds: usize) {}

    /// Called with an agent's private reasoning.
    fn on_thinking(&self, _agent: &str, _thinking: &str) {}

    /// Called when a lookup directive produced reference material.
    fn on_knowledge(&self, _agent: &str, _note: &KnowledgeNote) {}

    /// Called when a call is retried after a transient failure.
    fn on_retry(&self, _agent: &str, _operation: &str, _attempt: u32, _error: &GatewayError) {}

    // ==================== Stream Callbacks ====================

    /// Called when an agent starts streaming its public turn.
    fn on_stream_start(&self, _agent: &str) {}

    /// Called for each text chunk during streaming.
    fn on_stream_chunk(&self, _agent: &str, _chunk: &str) {}

    /// Called when a stream is restarted after a failed attempt; chunks
    /// already delivered for this turn should be discarded.
    fn on_stream_restart(&self, _agent: &str, _attempt: u32) {}

    /// Called when streaming finishes, successfully or not.
    fn on_stream_end(&self, _agent: &str) {}

    // ==================== Turn Callbacks ====================

    /// Called after a turn is appended to the transcript.
    fn on_turn_appended(&self, _turn: &Turn) {}

    /// Called when an agent's turn failed and a placeholder was recorded.
    fn on_turn_failed(&self, _placeholder: &TurnPlaceholder) {}

    // ==================== Coordinator Callbacks ====================

    fn on_coordinator_phase_start(&self, _phase: CoordinatorPhase, _round: Option<usize>) {}

    /// `degraded` is true when the phase produced a raw-text or unavailable artifact.
    fn on_coordinator_phase_complete(
        &self,
        _phase: CoordinatorPhase,
        _round: Option<usize>,
        _degraded: bool,
    ) {
    }

    /// Called before each repair cycle of a structured reply.
    fn on_repair_cycle(&self, _schema: &str, _cycle: usize, _issues: &[SchemaIssue]) {}

    // ==================== Session Callbacks ====================

    /// Called after a round and its coordinator phases complete.
    fn on_round_complete(&self, _snapshot: &SessionSnapshot) {}

    /// Called when the orchestrator observes a cancellation request.
    fn on_cancel_requested(&self) {}

    /// Called once with the final state.
    fn on_session_finished(&self, _snapshot: &SessionSnapshot) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {}

/// Consumer of streamed text for one turn.
pub trait TokenSink: Send + Sync {
    fn on_chunk(&self, chunk: &str);

    /// A new attempt starts; discard chunks from the previous one.
    fn on_restart(&self, _attempt: u32) {}

    fn on_complete(&self, _full_text: &str) {}

    fn on_cancelled(&self) {}
}

impl<F> TokenSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_chunk(&self, chunk: &str) {
        self(chunk)
    }
}

/// Routes one agent's stream to a [`ProgressNotifier`].
pub struct ProgressSink<'a> {
    agent: &'a str,
    progress: &'a dyn ProgressNotifier,
}

impl<'a> ProgressSink<'a> {
    pub fn new(agent: &'a str, progress: &'a dyn ProgressNotifier) -> Self {
        progress.on_stream_start(agent);
        Self { agent, progress }
    }
}

impl TokenSink for ProgressSink<'_> {
    fn on_chunk(&self, chunk: &str) {
        self.progress.on_stream_chunk(self.agent, chunk);
    }

    fn on_restart(&self, attempt: u32) {
        self.progress.on_stream_restart(self.agent, attempt);
    }

    fn on_complete(&self, _full_text: &str) {
        self.progress.on_stream_end(self.agent);
    }

    fn on_cancelled(&self) {
        self.progress.on_stream_end(self.agent);
    }
}
