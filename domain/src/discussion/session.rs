//! Discussion session entity.

use super::ledger::ConversationLedger;
use super::turn::{Turn, TurnPlaceholder};
use crate::agent::team::TaskForce;
use crate::coordinator::artifacts::{Artifact, FinalOutput, PlanAdjustment, ProgressReport, ProjectPlan};
use crate::coordinator::record::CoordinatorRecord;
use crate::core::error::DomainError;
use crate::core::topic::Topic;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Pending,
    Running,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Pending => "PENDING",
            SessionStatus::Running => "RUNNING",
            SessionStatus::Completed => "COMPLETED",
            SessionStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

/// One running discussion.
///
/// Lifecycle: `new -> start -> (complete_round)* -> finish | cancel`.
/// `current_round` counts completed rounds and never exceeds `total_rounds`.
#[derive(Debug, Clone)]
pub struct DiscussionSession {
    topic: Topic,
    total_rounds: usize,
    current_round: usize,
    status: SessionStatus,
    ledger: ConversationLedger,
    coordinator: Option<CoordinatorRecord>,
}

impl DiscussionSession {
    pub fn new(topic: Topic, total_rounds: usize) -> Result<Self, DomainError> {
        if total_rounds == 0 {
            return Err(DomainError::InvalidRounds(total_rounds));
        }
        Ok(Self {
            topic,
            total_rounds,
            current_round: 0,
            status: SessionStatus::Pending,
            ledger: ConversationLedger::new(),
            coordinator: None,
        })
    }

    /// Mark the session running and attach coordinator state when the team
    /// designates one. Only a pending session can start.
    pub fn start(&mut self, team: &TaskForce) -> Result<(), DomainError> {
        if self.status != SessionStatus::Pending {
            return Err(DomainError::SessionAlreadyStarted(self.status.to_string()));
        }
        self.coordinator = team.coordinator().map(|agent| {
            CoordinatorRecord::new(
                agent.name(),
                agent.archetype().unwrap_or_default(),
                self.total_rounds,
            )
        });
        self.status = SessionStatus::Running;
        Ok(())
    }

    /// Advance the round counter. Returns false once all rounds are done.
    pub fn complete_round(&mut self) -> bool {
        if self.current_round >= self.total_rounds {
            return false;
        }
        self.current_round += 1;
        true
    }

    pub fn finish(&mut self) {
        if !self.status.is_terminal() {
            self.status = SessionStatus::Completed;
        }
    }

    pub fn cancel(&mut self) {
        if !self.status.is_terminal() {
            self.status = SessionStatus::Cancelled;
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn total_rounds(&self) -> usize {
        self.total_rounds
    }

    /// Number of completed rounds; also the 0-indexed round now running.
    pub fn current_round(&self) -> usize {
        self.current_round
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_last_round(&self, round: usize) -> bool {
        round + 1 == self.total_rounds
    }

    pub fn ledger(&self) -> &ConversationLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut ConversationLedger {
        &mut self.ledger
    }

    pub fn coordinator(&self) -> Option<&CoordinatorRecord> {
        self.coordinator.as_ref()
    }

    pub fn coordinator_mut(&mut self) -> Option<&mut CoordinatorRecord> {
        self.coordinator.as_mut()
    }

    pub fn transcript(&self) -> &[Turn] {
        self.ledger.transcript()
    }

    /// Immutable copy of everything a presenter may read.
    pub fn snapshot(&self) -> SessionSnapshot {
        let coordinator = self.coordinator.as_ref();
        SessionSnapshot {
            topic: self.topic.content().to_string(),
            total_rounds: self.total_rounds,
            current_round: self.current_round,
            status: self.status,
            transcript: self.ledger.transcript().to_vec(),
            placeholders: self.ledger.placeholders().to_vec(),
            coordinator: coordinator.map(|c| c.name.clone()),
            plan: coordinator.and_then(|c| c.plan().cloned()),
            latest_report: coordinator.and_then(|c| c.latest_report().cloned()),
            latest_adjustment: coordinator.and_then(|c| c.latest_adjustment().cloned()),
            final_output: coordinator.and_then(|c| c.final_output().cloned()),
        }
    }
}

/// Point-in-time view of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub topic: String,
    pub total_rounds: usize,
    pub current_round: usize,
    pub status: SessionStatus,
    pub transcript: Vec<Turn>,
    pub placeholders: Vec<TurnPlaceholder>,
    pub coordinator: Option<String>,
    pub plan: Option<Artifact<ProjectPlan>>,
    pub latest_report: Option<Artifact<ProgressReport>>,
    pub latest_adjustment: Option<Artifact<PlanAdjustment>>,
    pub final_output: Option<FinalOutput>,
}
