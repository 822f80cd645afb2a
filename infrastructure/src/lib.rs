//! Infrastructure layer for taskforce
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: the Ollama inference gateway, the Wikipedia
//! knowledge lookup, the JSON team store, the JSONL conversation logger,
//! and configuration file loading.

pub mod config;
pub mod logging;
pub mod ollama;
pub mod team_store;
pub mod wikipedia;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigIssue, ConfigLoader, DEFAULT_TEAM_FILE, FileConfig, FileDiscussionConfig,
    FileLoggingConfig, FileOllamaConfig, FileTeamConfig, FileWikipediaConfig, Severity,
};
pub use logging::JsonlConversationLogger;
pub use ollama::{DEFAULT_OLLAMA_URL, OllamaGateway};
pub use team_store::JsonTeamRepository;
pub use wikipedia::{DEFAULT_USER_AGENT, WikipediaLookup};
