//! Coordinator archetypes.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a coordinator steers the discussion.
///
/// The archetype only changes the coordinator's default behavioural prompt;
/// every archetype drives the same phase sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoordinatorArchetype {
    #[default]
    Facilitator,
    Strategist,
    Mediator,
    ProjectManager,
}

impl CoordinatorArchetype {
    pub const ALL: [CoordinatorArchetype; 4] = [
        CoordinatorArchetype::Facilitator,
        CoordinatorArchetype::Strategist,
        CoordinatorArchetype::Mediator,
        CoordinatorArchetype::ProjectManager,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinatorArchetype::Facilitator => "facilitator",
            CoordinatorArchetype::Strategist => "strategist",
            CoordinatorArchetype::Mediator => "mediator",
            CoordinatorArchetype::ProjectManager => "project_manager",
        }
    }

    /// Pick an archetype from a free-text scenario description.
    ///
    /// Keyword groups are checked in order; the first group with a hit wins.
    pub fn infer(scenario: &str) -> Self {
        let scenario = scenario.to_lowercase();
        let has_any = |words: &[&str]| words.iter().any(|w| scenario.contains(w));

        if has_any(&["discuss", "brainstorm", "conversation"]) {
            CoordinatorArchetype::Facilitator
        } else if has_any(&["plan", "strategy", "timeline", "project"]) {
            CoordinatorArchetype::Strategist
        } else if has_any(&["conflict", "resolve", "mediate"]) {
            CoordinatorArchetype::Mediator
        } else {
            CoordinatorArchetype::Facilitator
        }
    }

    /// Default behavioural prompt for a coordinator of this archetype.
    pub fn default_prompt(&self) -> &'static str {
        match self {
            CoordinatorArchetype::Facilitator => {
                "You are a skilled discussion facilitator. Your role is to:\n\
                 - Guide the conversation in a productive direction\n\
                 - Ensure all participants have a chance to contribute\n\
                 - Keep the discussion focused on the main topic\n\
                 - Summarize key points and insights\n\
                 - Help the group reach meaningful conclusions"
            }
            CoordinatorArchetype::Strategist => {
                "You are a strategic discussion leader. Your role is to:\n\
                 - Identify key strategic implications\n\
                 - Guide discussions toward actionable outcomes\n\
                 - Help participants think long-term\n\
                 - Connect different perspectives into a coherent strategy\n\
                 - Ensure the discussion ends in practical recommendations"
            }
            CoordinatorArchetype::Mediator => {
                "You are an experienced mediator. Your role is to:\n\
                 - Help resolve conflicts and disagreements\n\
                 - Find common ground between different viewpoints\n\
                 - Keep the discussion respectful and constructive\n\
                 - Guide participants toward mutual understanding\n\
                 - Facilitate compromise when needed"
            }
            CoordinatorArchetype::ProjectManager => {
                "You are a project management expert. Your role is to:\n\
                 - Break down complex tasks into manageable steps\n\
                 - Track progress and identify potential issues\n\
                 - Keep the discussion focused on project goals\n\
                 - Help participants develop actionable plans\n\
                 - Monitor and adjust plans based on progress"
            }
        }
    }
}

impl std::fmt::Display for CoordinatorArchetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CoordinatorArchetype {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "facilitator" => Ok(CoordinatorArchetype::Facilitator),
            "strategist" => Ok(CoordinatorArchetype::Strategist),
            "mediator" => Ok(CoordinatorArchetype::Mediator),
            "project_manager" | "pm" => Ok(CoordinatorArchetype::ProjectManager),
            other => Err(DomainError::UnknownArchetype(other.to_string())),
        }
    }
}
