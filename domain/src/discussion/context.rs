//! Context handed to an agent for one turn.

use super::turn::Turn;
use serde::{Deserialize, Serialize};

/// Knowledge-lookup result attached to a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeNote {
    pub term: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnContext {
    /// 0-indexed.
    pub round: usize,
    pub total_rounds: usize,
    pub participants: Vec<String>,
    /// Windowed shared transcript, oldest first.
    pub recent_transcript: Vec<Turn>,
    /// Windowed private history of the agent taking the turn.
    pub own_history: Vec<Turn>,
    pub coordinator_digest: Option<String>,
    pub knowledge: Option<KnowledgeNote>,
}

impl TurnContext {
    pub fn new(round: usize, total_rounds: usize) -> Self {
        Self {
            round,
            total_rounds,
            ..Default::default()
        }
    }

    pub fn with_participants(mut self, participants: Vec<String>) -> Self {
        self.participants = participants;
        self
    }

    pub fn with_transcript(mut self, turns: &[Turn]) -> Self {
        self.recent_transcript = turns.to_vec();
        self
    }

    pub fn with_own_history(mut self, turns: &[Turn]) -> Self {
        self.own_history = turns.to_vec();
        self
    }

    pub fn with_coordinator_digest(mut self, digest: Option<String>) -> Self {
        self.coordinator_digest = digest;
        self
    }

    pub fn with_knowledge(mut self, note: Option<KnowledgeNote>) -> Self {
        self.knowledge = note;
        self
    }

    /// 1-based round number for prompts and display.
    pub fn display_round(&self) -> usize {
        self.round + 1
    }

    pub fn is_first_round(&self) -> bool {
        self.round == 0
    }

    pub fn is_last_round(&self) -> bool {
        self.round + 1 >= self.total_rounds
    }
}
