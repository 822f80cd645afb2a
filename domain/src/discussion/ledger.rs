//! Append-only conversation ledger.

use super::turn::{Turn, TurnPlaceholder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Shared transcript plus per-agent private histories.
///
/// Turns are only ever appended; windowing hides old turns from prompts but
/// never removes them from the transcript.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationLedger {
    transcript: Vec<Turn>,
    #[serde(skip)]
    histories: HashMap<String, Vec<Turn>>,
    placeholders: Vec<TurnPlaceholder>,
}

impl ConversationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the speaker's private history and to the shared transcript.
    pub fn append(&mut self, turn: Turn) {
        self.histories
            .entry(turn.speaker.clone())
            .or_default()
            .push(turn.clone());
        self.transcript.push(turn);
    }

    /// Record that a turn was attempted and failed.
    pub fn record_failure(
        &mut self,
        speaker: impl Into<String>,
        round: usize,
        operation: impl Into<String>,
        cause: impl Into<String>,
    ) -> TurnPlaceholder {
        let placeholder = TurnPlaceholder {
            speaker: speaker.into(),
            round,
            position: self.transcript.len(),
            operation: operation.into(),
            cause: cause.into(),
        };
        self.placeholders.push(placeholder.clone());
        placeholder
    }

    /// The most recent `max_turns` turns of one agent's history, oldest first.
    pub fn windowed_history(&self, agent: &str, max_turns: usize) -> &[Turn] {
        self.histories
            .get(agent)
            .map(|h| last_n(h, max_turns))
            .unwrap_or(&[])
    }

    /// The most recent `max_turns` transcript turns, oldest first.
    pub fn windowed_transcript(&self, max_turns: usize) -> &[Turn] {
        last_n(&self.transcript, max_turns)
    }

    /// Like [`windowed_transcript`](Self::windowed_transcript) but only over
    /// turns from rounds before `round`.
    pub fn windowed_transcript_before(&self, round: usize, max_turns: usize) -> &[Turn] {
        let end = self.transcript.partition_point(|t| t.round < round);
        last_n(&self.transcript[..end], max_turns)
    }

    /// Empty one agent's private history; the transcript is untouched.
    pub fn clear(&mut self, agent: &str) {
        if let Some(history) = self.histories.get_mut(agent) {
            history.clear();
        }
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn placeholders(&self) -> &[TurnPlaceholder] {
        &self.placeholders
    }

    pub fn turns_in_round(&self, round: usize) -> impl Iterator<Item = &Turn> {
        self.transcript.iter().filter(move |t| t.round == round)
    }

    pub fn len(&self) -> usize {
        self.transcript.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }
}

/// Render turns as `speaker: text` lines separated by blank lines.
pub fn render_turns(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(Turn::as_prompt_line)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn last_n(turns: &[Turn], n: usize) -> &[Turn] {
    &turns[turns.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with(turns: &[(&str, usize)]) -> ConversationLedger {
        let mut ledger = ConversationLedger::new();
        for (i, (speaker, round)) in turns.iter().enumerate() {
            ledger.append(Turn::new(*speaker, format!("t{i}"), *round));
        }
        ledger
    }

    #[test]
    fn test_windowed_history_returns_last_n_in_order() {
        let ledger = ledger_with(&[("Ada", 0), ("Ada", 0), ("Ada", 1), ("Ada", 1), ("Ada", 2)]);
        let window = ledger.windowed_history("Ada", 3);
        let texts: Vec<_> = window.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["t2", "t3", "t4"]);
    }

    #[test]
    fn test_windowed_history_larger_than_history() {
        let ledger = ledger_with(&[("Ada", 0), ("Bo", 0)]);
        assert_eq!(ledger.windowed_history("Ada", 10).len(), 1);
        assert!(ledger.windowed_history("Cy", 10).is_empty());
        assert!(ledger.windowed_history("Ada", 0).is_empty());
    }

    #[test]
    fn test_transcript_keeps_invocation_order() {
        let ledger = ledger_with(&[("Ada", 0), ("Bo", 0), ("Ada", 1)]);
        let speakers: Vec<_> = ledger.transcript().iter().map(|t| t.speaker.as_str()).collect();
        assert_eq!(speakers, vec!["Ada", "Bo", "Ada"]);
        assert_eq!(ledger.windowed_transcript(2)[0].speaker, "Bo");
    }

    #[test]
    fn test_clear_only_affects_private_history() {
        let mut ledger = ledger_with(&[("Ada", 0), ("Bo", 0)]);
        ledger.clear("Ada");
        assert!(ledger.windowed_history("Ada", 5).is_empty());
        assert_eq!(ledger.windowed_history("Bo", 5).len(), 1);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_window_before_round_excludes_current_round() {
        let ledger = ledger_with(&[("Ada", 0), ("Bo", 0), ("Ada", 1), ("Bo", 1)]);
        let window = ledger.windowed_transcript_before(1, 5);
        assert_eq!(window.len(), 2);
        assert!(window.iter().all(|t| t.round == 0));
        assert!(ledger.windowed_transcript_before(0, 5).is_empty());
    }

    #[test]
    fn test_failures_are_not_transcript_entries() {
        let mut ledger = ledger_with(&[("Ada", 0)]);
        let placeholder = ledger.record_failure("Bo", 0, "respond", "connection refused");
        assert_eq!(placeholder.position, 1);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.placeholders().len(), 1);
        assert!(ledger.windowed_history("Bo", 5).is_empty());
    }
}
