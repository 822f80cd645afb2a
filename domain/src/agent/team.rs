//! Team assembly and validation.

use super::archetype::CoordinatorArchetype;
use super::entities::{Agent, AgentRecord};
use crate::core::error::DomainError;
use crate::core::model::Model;
use std::collections::HashSet;

/// A validated set of agents with at most one coordinator.
///
/// Construction is the only place where `ConfigurationInvalid` conditions are
/// detected: once a `TaskForce` exists, names are unique and the coordinator
/// (if any) is a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskForce {
    agents: Vec<Agent>,
    coordinator: Option<String>,
}

impl TaskForce {
    /// Validate and assemble a team. Turn order is the order of `agents`.
    pub fn assemble(agents: Vec<Agent>) -> Result<Self, DomainError> {
        if agents.is_empty() {
            return Err(DomainError::EmptyTeam);
        }

        let mut seen = HashSet::new();
        let mut coordinator: Option<String> = None;
        for agent in &agents {
            if agent.name().is_empty() {
                return Err(DomainError::EmptyField { field: "agent name" });
            }
            if agent.role().is_empty() {
                return Err(DomainError::EmptyField { field: "agent role" });
            }
            if !seen.insert(agent.name().to_string()) {
                return Err(DomainError::DuplicateAgentName(agent.name().to_string()));
            }
            if agent.is_coordinator() {
                if let Some(first) = &coordinator {
                    return Err(DomainError::MultipleCoordinators {
                        first: first.clone(),
                        second: agent.name().to_string(),
                    });
                }
                coordinator = Some(agent.name().to_string());
            }
        }

        Ok(Self {
            agents,
            coordinator,
        })
    }

    /// Assemble from persisted records.
    pub fn from_records(records: Vec<AgentRecord>, default_model: &Model) -> Result<Self, DomainError> {
        Self::assemble(
            records
                .into_iter()
                .map(|r| r.into_agent(default_model))
                .collect(),
        )
    }

    pub fn to_records(&self) -> Vec<AgentRecord> {
        self.agents.iter().map(Agent::to_record).collect()
    }

    /// Designate `name` as the coordinator, replacing any previous designation.
    pub fn designate_coordinator(
        self,
        name: &str,
        archetype: CoordinatorArchetype,
    ) -> Result<Self, DomainError> {
        if !self.agents.iter().any(|a| a.name() == name) {
            return Err(DomainError::UnknownCoordinator(name.to_string()));
        }
        let agents = self
            .agents
            .into_iter()
            .map(|a| {
                if a.name() == name {
                    let archetype = a.archetype().unwrap_or(archetype);
                    a.promote(archetype)
                } else {
                    a.demote()
                }
            })
            .collect();
        Self::assemble(agents)
    }

    /// Run the team with agent-only turns.
    pub fn without_coordinator(self) -> Self {
        Self {
            agents: self.agents.into_iter().map(Agent::demote).collect(),
            coordinator: None,
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name() == name)
    }

    pub fn coordinator(&self) -> Option<&Agent> {
        self.coordinator.as_deref().and_then(|name| self.agent(name))
    }

    pub fn has_coordinator(&self) -> bool {
        self.coordinator.is_some()
    }

    /// Non-coordinator agents in turn order.
    pub fn participants(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| !a.is_coordinator())
    }

    pub fn participant_names(&self) -> Vec<String> {
        self.participants().map(|a| a.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(name: &str) -> Agent {
        Agent::participant(name, "Analyst", "Analyse things", Model::default())
    }

    #[test]
    fn test_assemble_rejects_duplicate_names() {
        let result = TaskForce::assemble(vec![agent("Ada"), agent("Bo"), agent("Ada")]);
        assert_eq!(result, Err(DomainError::DuplicateAgentName("Ada".into())));
    }

    #[test]
    fn test_assemble_rejects_empty_team() {
        assert_eq!(TaskForce::assemble(vec![]), Err(DomainError::EmptyTeam));
    }

    #[test]
    fn test_assemble_rejects_two_coordinators() {
        let result = TaskForce::assemble(vec![
            agent("Ada").promote(CoordinatorArchetype::Facilitator),
            agent("Bo").promote(CoordinatorArchetype::Mediator),
        ]);
        assert!(matches!(
            result,
            Err(DomainError::MultipleCoordinators { .. })
        ));
    }

    #[test]
    fn test_designate_unknown_coordinator_fails() {
        let team = TaskForce::assemble(vec![agent("Ada"), agent("Bo")]).unwrap();
        let result = team.designate_coordinator("Cy", CoordinatorArchetype::Facilitator);
        assert_eq!(result, Err(DomainError::UnknownCoordinator("Cy".into())));
    }

    #[test]
    fn test_designate_moves_the_flag() {
        let team = TaskForce::assemble(vec![
            agent("Ada").promote(CoordinatorArchetype::Mediator),
            agent("Bo"),
            agent("Cy"),
        ])
        .unwrap();
        assert_eq!(team.coordinator().unwrap().name(), "Ada");

        let team = team
            .designate_coordinator("Bo", CoordinatorArchetype::Strategist)
            .unwrap();
        assert_eq!(team.coordinator().unwrap().name(), "Bo");
        assert_eq!(
            team.coordinator().unwrap().archetype(),
            Some(CoordinatorArchetype::Strategist)
        );
        assert_eq!(team.participant_names(), vec!["Ada", "Cy"]);
    }

    #[test]
    fn test_without_coordinator_keeps_everyone_as_participant() {
        let team = TaskForce::assemble(vec![
            agent("Ada").promote(CoordinatorArchetype::Facilitator),
            agent("Bo"),
        ])
        .unwrap()
        .without_coordinator();
        assert!(!team.has_coordinator());
        assert_eq!(team.participant_names(), vec!["Ada", "Bo"]);
    }

    #[test]
    fn test_records_round_trip_through_team() {
        let records = vec![
            AgentRecord::new("Ada", "Engineer", "Build"),
            AgentRecord::new("Chair", "Coordinator", "")
                .as_coordinator(CoordinatorArchetype::ProjectManager),
        ];
        let team = TaskForce::from_records(records, &Model::default()).unwrap();
        assert_eq!(team.len(), 2);
        let back = team.to_records();
        assert!(back[1].is_coordinator);
        assert_eq!(back[1].archetype, Some(CoordinatorArchetype::ProjectManager));
        assert_eq!(back[0].model, Some(Model::default()));
    }
}
