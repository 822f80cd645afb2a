//! Domain error types

use thiserror::Error;

/// Domain-level errors
///
/// Everything except [`DomainError::Cancelled`] is a configuration problem
/// detected while assembling a team or a session, before any inference call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Configuration invalid: duplicate agent name '{0}'")]
    DuplicateAgentName(String),

    #[error("Configuration invalid: coordinator '{0}' is not a member of the team")]
    UnknownCoordinator(String),

    #[error("Configuration invalid: more than one coordinator designated ('{first}' and '{second}')")]
    MultipleCoordinators { first: String, second: String },

    #[error("Configuration invalid: {field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("Configuration invalid: rounds must be at least 1 (got {0})")]
    InvalidRounds(usize),

    #[error("Configuration invalid: the team has no agents")]
    EmptyTeam,

    #[error("Configuration invalid: the team has no participants besides the coordinator")]
    NoParticipants,

    #[error("Configuration invalid: session is already {0}; a session runs only once")]
    SessionAlreadyStarted(String),

    #[error("Invalid topic: {0}")]
    InvalidTopic(String),

    #[error("Unknown coordinator archetype: {0}")]
    UnknownArchetype(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }

    /// Whether this error is a configuration problem that must prevent a
    /// discussion from starting.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, DomainError::Cancelled)
    }
}
