//! Turns and failed-turn placeholders.

use serde::{Deserialize, Serialize};

/// One recorded utterance by one agent within one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: String,
    pub text: String,
    /// 0-indexed round the turn belongs to.
    pub round: usize,
}

impl Turn {
    pub fn new(speaker: impl Into<String>, text: impl Into<String>, round: usize) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
            round,
        }
    }

    /// `speaker: text`, the form used inside prompts.
    pub fn as_prompt_line(&self) -> String {
        format!("{}: {}", self.speaker, self.text.trim())
    }
}

/// Marker recorded in place of a turn whose inference call failed.
///
/// Placeholders never enter the transcript; `position` is the transcript
/// length at the time of failure so that renderers can interleave them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnPlaceholder {
    pub speaker: String,
    pub round: usize,
    pub position: usize,
    pub operation: String,
    pub cause: String,
}

impl TurnPlaceholder {
    pub fn describe(&self) -> String {
        format!(
            "[{} did not contribute in round {}: {} failed: {}]",
            self.speaker,
            self.round + 1,
            self.operation,
            self.cause
        )
    }
}
