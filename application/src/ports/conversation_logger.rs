//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording discussion events
//! (turns, failures, coordinator phases, repair cycles) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! discussion in a machine-readable format (JSONL).

use serde_json::{Value, json};
use taskforce_domain::{CoordinatorPhase, SessionSnapshot, Turn, TurnPlaceholder};

/// A structured conversation event for logging.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "turn_appended", "coordinator_phase").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    pub fn session_started(snapshot: &SessionSnapshot, agents: &[String]) -> Self {
        Self::new(
            "session_started",
            json!({
                "topic": snapshot.topic,
                "total_rounds": snapshot.total_rounds,
                "agents": agents,
                "coordinator": snapshot.coordinator,
            }),
        )
    }

    pub fn turn_appended(turn: &Turn) -> Self {
        Self::new(
            "turn_appended",
            json!({
                "speaker": turn.speaker,
                "round": turn.round,
                "text": turn.text,
                "bytes": turn.text.len(),
            }),
        )
    }

    pub fn turn_failed(placeholder: &TurnPlaceholder) -> Self {
        Self::new(
            "turn_failed",
            json!({
                "speaker": placeholder.speaker,
                "round": placeholder.round,
                "operation": placeholder.operation,
                "cause": placeholder.cause,
            }),
        )
    }

    pub fn coordinator_phase(
        phase: CoordinatorPhase,
        round: Option<usize>,
        status: &str,
        artifact: Value,
    ) -> Self {
        Self::new(
            "coordinator_phase",
            json!({
                "phase": phase.as_str(),
                "round": round,
                "status": status,
                "artifact": artifact,
            }),
        )
    }

    pub fn repair_cycle(schema: &str, cycle: usize, issues: &[String]) -> Self {
        Self::new(
            "repair_cycle",
            json!({
                "schema": schema,
                "cycle": cycle,
                "issues": issues,
            }),
        )
    }

    pub fn session_finished(snapshot: &SessionSnapshot) -> Self {
        Self::new(
            "session_finished",
            json!({
                "status": snapshot.status,
                "completed_rounds": snapshot.current_round,
                "turns": snapshot.transcript.len(),
                "failed_turns": snapshot.placeholders.len(),
            }),
        )
    }
}

/// Port for logging conversation events to a structured log.
///
/// `log` is synchronous and infallible; implementations swallow their own
/// I/O errors.
pub trait ConversationLogger: Send + Sync {
    /// Record a conversation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_event_payload() {
        let event = ConversationEvent::turn_appended(&Turn::new("Ada", "Hello", 1));
        assert_eq!(event.event_type, "turn_appended");
        assert_eq!(event.payload["speaker"], "Ada");
        assert_eq!(event.payload["round"], 1);
        assert_eq!(event.payload["bytes"], 5);
    }

    #[test]
    fn test_phase_event_uses_phase_name() {
        let event = ConversationEvent::coordinator_phase(
            CoordinatorPhase::Tracking,
            Some(0),
            "parsed",
            Value::Null,
        );
        assert_eq!(event.payload["phase"], "TRACKING");
        assert_eq!(event.payload["status"], "parsed");
    }
}
