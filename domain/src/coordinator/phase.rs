//! Coordinator phase sequencing.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Phases a coordinator moves through during one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoordinatorPhase {
    Planning,
    Tracking,
    Adjusting,
    Summarizing,
    Deciding,
    Done,
}

impl CoordinatorPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinatorPhase::Planning => "PLANNING",
            CoordinatorPhase::Tracking => "TRACKING",
            CoordinatorPhase::Adjusting => "ADJUSTING",
            CoordinatorPhase::Summarizing => "SUMMARIZING",
            CoordinatorPhase::Deciding => "DECIDING",
            CoordinatorPhase::Done => "DONE",
        }
    }

    /// Phases to run at the boundary after 0-indexed `round`.
    pub fn after_round(round: usize, total_rounds: usize) -> [CoordinatorPhase; 2] {
        if round + 1 < total_rounds {
            [CoordinatorPhase::Tracking, CoordinatorPhase::Adjusting]
        } else {
            [CoordinatorPhase::Summarizing, CoordinatorPhase::Deciding]
        }
    }
}

impl fmt::Display for CoordinatorPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid coordinator transition {from} -> {to}")]
pub struct PhaseTransitionError {
    pub from: String,
    pub to: CoordinatorPhase,
}

/// One entered phase, with the round boundary it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseEntry {
    pub phase: CoordinatorPhase,
    /// `None` for PLANNING (before round 0) and DONE.
    pub round: Option<usize>,
}

/// Guards the `PLANNING -> (TRACKING <-> ADJUSTING)* -> SUMMARIZING ->
/// DECIDING -> DONE` sequence.
///
/// The orchestrator drives every transition; the machine only refuses
/// transitions that would break the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseMachine {
    total_rounds: usize,
    current: Option<CoordinatorPhase>,
    history: Vec<PhaseEntry>,
}

impl PhaseMachine {
    pub fn new(total_rounds: usize) -> Self {
        Self {
            total_rounds,
            current: None,
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<CoordinatorPhase> {
        self.current
    }

    pub fn history(&self) -> &[PhaseEntry] {
        &self.history
    }

    pub fn is_done(&self) -> bool {
        self.current == Some(CoordinatorPhase::Done)
    }

    /// Enter `to`. `round` is the 0-indexed round whose boundary triggers it.
    pub fn advance(
        &mut self,
        to: CoordinatorPhase,
        round: Option<usize>,
    ) -> Result<(), PhaseTransitionError> {
        if !self.allows(to, round) {
            return Err(PhaseTransitionError {
                from: self
                    .current
                    .map(|p| p.as_str().to_string())
                    .unwrap_or_else(|| "START".to_string()),
                to,
            });
        }
        self.current = Some(to);
        self.history.push(PhaseEntry { phase: to, round });
        Ok(())
    }

    fn allows(&self, to: CoordinatorPhase, round: Option<usize>) -> bool {
        use CoordinatorPhase::*;

        let last_round = self.total_rounds.saturating_sub(1);
        let boundary_ok = |expected_last: bool| match round {
            Some(r) if r < self.total_rounds => (r == last_round) == expected_last,
            _ => false,
        };
        let same_round = || self.history.last().map(|e| e.round) == Some(round);

        match (self.current, to) {
            (None, Planning) => round.is_none(),
            (Some(Planning), Tracking) => boundary_ok(false),
            (Some(Planning), Summarizing) => boundary_ok(true),
            (Some(Tracking), Adjusting) => same_round(),
            (Some(Adjusting), Tracking) => boundary_ok(false) && !same_round(),
            (Some(Adjusting), Summarizing) => boundary_ok(true),
            (Some(Summarizing), Deciding) => same_round(),
            (Some(Deciding), Done) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CoordinatorPhase::*;

    fn drive(total: usize) -> PhaseMachine {
        let mut machine = PhaseMachine::new(total);
        machine.advance(Planning, None).unwrap();
        for round in 0..total {
            for phase in CoordinatorPhase::after_round(round, total) {
                machine.advance(phase, Some(round)).unwrap();
            }
        }
        machine.advance(Done, None).unwrap();
        machine
    }

    #[test]
    fn test_three_round_sequence() {
        let machine = drive(3);
        let phases: Vec<_> = machine.history().iter().map(|e| (e.phase, e.round)).collect();
        assert_eq!(
            phases,
            vec![
                (Planning, None),
                (Tracking, Some(0)),
                (Adjusting, Some(0)),
                (Tracking, Some(1)),
                (Adjusting, Some(1)),
                (Summarizing, Some(2)),
                (Deciding, Some(2)),
                (Done, None),
            ]
        );
        assert!(machine.is_done());
    }

    #[test]
    fn test_single_round_goes_straight_to_summary() {
        let machine = drive(1);
        let phases: Vec<_> = machine.history().iter().map(|e| e.phase).collect();
        assert_eq!(phases, vec![Planning, Summarizing, Deciding, Done]);
    }

    #[test]
    fn test_rejects_out_of_order_transitions() {
        let mut machine = PhaseMachine::new(3);
        assert!(machine.advance(Tracking, Some(0)).is_err());
        machine.advance(Planning, None).unwrap();
        assert!(machine.advance(Planning, None).is_err());
        // summarizing before the last round
        assert!(machine.advance(Summarizing, Some(1)).is_err());
        machine.advance(Tracking, Some(0)).unwrap();
        // adjusting must stay in the same boundary
        assert!(machine.advance(Adjusting, Some(1)).is_err());
        machine.advance(Adjusting, Some(0)).unwrap();
        // the same boundary cannot be tracked twice
        assert!(machine.advance(Tracking, Some(0)).is_err());
    }

    #[test]
    fn test_done_is_terminal() {
        let mut machine = drive(2);
        let err = machine.advance(Tracking, Some(0)).unwrap_err();
        assert_eq!(err.from, "DONE");
        assert_eq!(err.to_string(), "invalid coordinator transition DONE -> TRACKING");
    }

    #[test]
    fn test_after_round_table() {
        assert_eq!(CoordinatorPhase::after_round(0, 3), [Tracking, Adjusting]);
        assert_eq!(CoordinatorPhase::after_round(2, 3), [Summarizing, Deciding]);
    }
}
