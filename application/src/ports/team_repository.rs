//! Port for loading and saving team definitions.

use taskforce_domain::AgentRecord;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TeamStoreError {
    #[error("team file not found: {0}")]
    NotFound(String),

    #[error("failed to access team file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("team file {path} is not a valid team definition: {message}")]
    Parse { path: String, message: String },
}

/// Persistence collaborator for team definitions.
///
/// Records are handed over as plain data; validation happens when they are
/// assembled into a `TaskForce`.
pub trait TeamRepository: Send + Sync {
    fn load(&self) -> Result<Vec<AgentRecord>, TeamStoreError>;

    fn save(&self, records: &[AgentRecord]) -> Result<(), TeamStoreError>;

    /// Human-readable location for messages.
    fn location(&self) -> String;
}
