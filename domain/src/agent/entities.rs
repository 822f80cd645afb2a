//! Agent entity and its persisted record shape.

use super::archetype::CoordinatorArchetype;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// One discussion participant bound to a single model.
///
/// An agent's conversation history is not stored here; the
/// [`ConversationLedger`](crate::discussion::ledger::ConversationLedger) keeps
/// it, keyed by agent name, so that a session owns all mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    name: String,
    role: String,
    base_prompt: String,
    model: Model,
    coordinator: Option<CoordinatorArchetype>,
}

impl Agent {
    /// A regular participant. An empty `base_prompt` is replaced by a
    /// role-derived default.
    pub fn participant(
        name: impl Into<String>,
        role: impl Into<String>,
        base_prompt: impl Into<String>,
        model: Model,
    ) -> Self {
        let role = role.into().trim().to_string();
        let base_prompt = non_empty_or(base_prompt.into(), || default_participant_prompt(&role));
        Self {
            name: name.into().trim().to_string(),
            role,
            base_prompt,
            model,
            coordinator: None,
        }
    }

    /// A coordinator. Without a custom prompt the archetype's default is used.
    pub fn coordinator(
        name: impl Into<String>,
        archetype: CoordinatorArchetype,
        base_prompt: Option<String>,
        model: Model,
    ) -> Self {
        let base_prompt = non_empty_or(base_prompt.unwrap_or_default(), || {
            archetype.default_prompt().to_string()
        });
        Self {
            name: name.into().trim().to_string(),
            role: format!("Coordinator ({archetype})"),
            base_prompt,
            model,
            coordinator: Some(archetype),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn base_prompt(&self) -> &str {
        &self.base_prompt
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn is_coordinator(&self) -> bool {
        self.coordinator.is_some()
    }

    pub fn archetype(&self) -> Option<CoordinatorArchetype> {
        self.coordinator
    }

    /// Promote this agent to coordinator, keeping its own prompt and role.
    pub fn promote(mut self, archetype: CoordinatorArchetype) -> Self {
        self.coordinator = Some(archetype);
        self
    }

    /// Drop the coordinator capability.
    pub fn demote(mut self) -> Self {
        self.coordinator = None;
        self
    }

    pub fn to_record(&self) -> AgentRecord {
        AgentRecord {
            name: self.name.clone(),
            role: self.role.clone(),
            prompt: self.base_prompt.clone(),
            model: Some(self.model.clone()),
            is_coordinator: self.is_coordinator(),
            archetype: self.coordinator,
        }
    }
}

fn non_empty_or(value: String, fallback: impl FnOnce() -> String) -> String {
    if value.trim().is_empty() {
        fallback()
    } else {
        value
    }
}

fn default_participant_prompt(role: &str) -> String {
    format!(
        "You are a {role} participating in a group discussion.\n\
         Your goal is to contribute meaningfully to the conversation while staying true to your role.\n\
         Consider the topic carefully and provide insights based on your expertise."
    )
}

/// Plain structured record exchanged with the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Model>,
    #[serde(default)]
    pub is_coordinator: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<CoordinatorArchetype>,
}

impl AgentRecord {
    pub fn new(name: impl Into<String>, role: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            prompt: prompt.into(),
            model: None,
            is_coordinator: false,
            archetype: None,
        }
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    pub fn as_coordinator(mut self, archetype: CoordinatorArchetype) -> Self {
        self.is_coordinator = true;
        self.archetype = Some(archetype);
        self
    }

    /// Convert into an [`Agent`], using `default_model` when the record has none.
    pub fn into_agent(self, default_model: &Model) -> Agent {
        let model = self
            .model
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| default_model.clone());
        let agent = Agent::participant(self.name, self.role, self.prompt, model);
        if self.is_coordinator {
            agent.promote(self.archetype.unwrap_or_default())
        } else {
            agent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_gets_default_prompt() {
        let agent = Agent::participant("Ada", "Data Scientist", "  ", Model::default());
        assert!(agent.base_prompt().contains("Data Scientist"));
        assert!(!agent.is_coordinator());
    }

    #[test]
    fn test_coordinator_uses_archetype_prompt() {
        let agent = Agent::coordinator(
            "Chair",
            CoordinatorArchetype::Mediator,
            None,
            Model::default(),
        );
        assert!(agent.is_coordinator());
        assert_eq!(agent.role(), "Coordinator (mediator)");
        assert!(agent.base_prompt().contains("mediator"));
    }

    #[test]
    fn test_record_conversion_keeps_coordinator_flag() {
        let record = AgentRecord::new("Chair", "Facilitator", "Lead the talk")
            .as_coordinator(CoordinatorArchetype::Strategist);
        let agent = record.clone().into_agent(&Model::new("mistral"));
        assert_eq!(agent.archetype(), Some(CoordinatorArchetype::Strategist));
        assert_eq!(agent.model().as_str(), "mistral");
        assert_eq!(agent.base_prompt(), "Lead the talk");

        let back = agent.to_record();
        assert!(back.is_coordinator);
        assert_eq!(back.model, Some(Model::new("mistral")));
    }

    #[test]
    fn test_record_deserializes_minimal_shape() {
        let record: AgentRecord =
            serde_json::from_str(r#"{"name":"Bo","role":"Critic","prompt":"Be sharp"}"#).unwrap();
        assert!(!record.is_coordinator);
        assert!(record.model.is_none());
        assert!(record.archetype.is_none());
    }
}
