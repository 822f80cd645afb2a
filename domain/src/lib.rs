//! Domain layer for taskforce
//!
//! This crate contains the core discussion entities and pure logic.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Task force
//!
//! A [`TaskForce`] is a validated set of [`Agent`]s. At most one of them is
//! the coordinator; the others take turns in every round.
//!
//! ## Discussion
//!
//! A [`DiscussionSession`] owns the [`ConversationLedger`] (shared transcript
//! plus per-agent histories) and, when a coordinator is present, its
//! [`CoordinatorRecord`]: the plan, progress reports, adjustments and final
//! output, sequenced by a [`PhaseMachine`].
//!
//! ## Structured output
//!
//! Coordinator phases ask for JSON. [`structured`] finds the payload in
//! free-form text and validates it against a required-key [`Schema`].

pub mod agent;
pub mod coordinator;
pub mod core;
pub mod discussion;
pub mod lookup;
pub mod prompt;
pub mod structured;
pub mod util;

// Re-export commonly used types
pub use agent::{
    archetype::CoordinatorArchetype,
    entities::{Agent, AgentRecord},
    team::TaskForce,
};
pub use coordinator::{
    artifacts::{
        Artifact, FinalOutput, Milestone, ObjectiveChange, PlanAdjustment, ProgressReport,
        ProjectPlan, ResourceChange, Resources, Risk, RiskChange, RiskManagement, Timeline,
        TimelineChange,
    },
    phase::{CoordinatorPhase, PhaseEntry, PhaseMachine, PhaseTransitionError},
    record::CoordinatorRecord,
};
pub use core::{
    error::DomainError,
    model::{DEFAULT_MODEL, Model},
    topic::Topic,
};
pub use discussion::{
    context::{KnowledgeNote, TurnContext},
    ledger::ConversationLedger,
    session::{DiscussionSession, SessionSnapshot, SessionStatus},
    stream::StreamEvent,
    turn::{Turn, TurnPlaceholder},
};
pub use lookup::find_lookup_term;
pub use prompt::{CoordinatorPrompt, DiscussionPrompt, RepairPrompt, TeamPrompt};
pub use structured::{Schema, SchemaIssue, Shape, extract_array, extract_object, extract_validated};
