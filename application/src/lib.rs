//! Application layer for taskforce
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::DiscussionParams;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    knowledge::{KnowledgeCache, KnowledgeLookup, NoKnowledge},
    llm_gateway::{GatewayError, GenerateRequest, LlmGateway, StreamHandle},
    progress::{NoProgress, ProgressNotifier, ProgressSink, TokenSink},
    team_repository::{TeamRepository, TeamStoreError},
};
pub use use_cases::agent_responder::{AgentCallError, AgentResponseGenerator};
pub use use_cases::coordinator::{CoordinatorError, CoordinatorStateMachine};
pub use use_cases::generate_team::{GenerateTeamError, GenerateTeamUseCase};
pub use use_cases::retry::{CallOutcome, RetryFailure, RetryPolicy, run_with_retry};
pub use use_cases::run_discussion::{RunDiscussionError, RunDiscussionUseCase};
pub use use_cases::structured_output::StructuredOutputParser;
