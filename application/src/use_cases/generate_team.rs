//! Generate Team use case
//!
//! Asks a model to compose a task force for a scenario and turns the JSON
//! array it returns into validated [`AgentRecord`]s.

use crate::config::DiscussionParams;
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::ProgressNotifier;
use crate::use_cases::agent_responder::{AgentCallError, AgentResponseGenerator};
use std::sync::Arc;
use taskforce_domain::{
    Agent, AgentRecord, CoordinatorArchetype, DomainError, Model, Schema, TaskForce, TeamPrompt,
    extract_array,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

const COORDINATOR_ROLE_WORDS: [&str; 4] = ["coordinator", "facilitator", "moderator", "mediator"];

#[derive(Error, Debug)]
pub enum GenerateTeamError {
    #[error("Team generation failed: {0}")]
    Inference(#[from] AgentCallError),

    #[error("Generated team is invalid: {0}")]
    ValidationFailed(String),

    #[error(transparent)]
    ConfigurationInvalid(#[from] DomainError),
}

/// Use case for composing a team from a scenario description
pub struct GenerateTeamUseCase {
    gateway: Arc<dyn LlmGateway>,
    params: DiscussionParams,
    model: Model,
    cancellation: Option<CancellationToken>,
}

impl GenerateTeamUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, params: DiscussionParams, model: Model) -> Self {
        Self {
            gateway,
            params,
            model,
            cancellation: None,
        }
    }

    /// Set cancellation token for graceful shutdown
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Generate and validate a team. The member whose role names a
    /// coordinating function becomes the coordinator, with an archetype
    /// inferred from the scenario.
    pub async fn execute(
        &self,
        scenario: &str,
        progress: &dyn ProgressNotifier,
    ) -> Result<Vec<AgentRecord>, GenerateTeamError> {
        let composer = Agent::participant(
            "Team composer",
            "Team composition expert",
            "Compose balanced teams.",
            self.model.clone(),
        );
        let generator = AgentResponseGenerator::new(composer, Arc::clone(&self.gateway), &self.params)
            .with_cancellation(self.cancellation.clone());

        info!("Generating team for scenario: {}", scenario);
        let text = generator
            .complete("generate_team", TeamPrompt::compose(scenario), progress)
            .await?;

        let records = parse_team(&text, &self.model)?;
        let archetype = CoordinatorArchetype::infer(scenario);
        let records = designate_coordinator(records, archetype);

        // Same checks a loaded team goes through.
        TaskForce::from_records(records.clone(), &self.model)?;
        info!("Generated team of {} agents", records.len());
        Ok(records)
    }
}

fn parse_team(text: &str, model: &Model) -> Result<Vec<AgentRecord>, GenerateTeamError> {
    let items = extract_array(text)
        .ok_or_else(|| GenerateTeamError::ValidationFailed("no JSON array found in the response".into()))?;
    if items.is_empty() {
        return Err(GenerateTeamError::ValidationFailed("the team is empty".into()));
    }

    let schema = Schema::team_member();
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            let member = schema.validate(item).map_err(|issues| {
                let issues: Vec<String> = issues.iter().map(ToString::to_string).collect();
                GenerateTeamError::ValidationFailed(format!("agent {}: {}", i + 1, issues.join("; ")))
            })?;
            let field = |key: &str| {
                member
                    .get(key)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string()
            };
            Ok(AgentRecord::new(field("name"), field("role"), field("prompt")).with_model(model.clone()))
        })
        .collect()
}

fn designate_coordinator(
    mut records: Vec<AgentRecord>,
    archetype: CoordinatorArchetype,
) -> Vec<AgentRecord> {
    let position = records.iter().position(|r| {
        let role = r.role.to_lowercase();
        COORDINATOR_ROLE_WORDS.iter().any(|word| role.contains(word))
    });
    match position {
        Some(i) => {
            let record = records.remove(i).as_coordinator(archetype);
            records.insert(i, record);
        }
        None => warn!("Generated team has no coordinating member"),
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::use_cases::retry::RetryPolicy;
    use crate::use_cases::test_support::{Scripted, ScriptedGateway};

    fn use_case(reply: &str) -> GenerateTeamUseCase {
        let gateway = Arc::new(ScriptedGateway::new(vec![Scripted::text(reply)]));
        let params = DiscussionParams::default().with_retry(RetryPolicy::no_retry());
        GenerateTeamUseCase::new(gateway, params, Model::default())
    }

    #[tokio::test]
    async fn test_generates_team_with_inferred_coordinator() {
        let reply = r#"Sure! Here is the team:
```json
[
  {"name": "Maya", "role": "Project Coordinator", "prompt": "Keep everyone on track."},
  {"name": "Leo", "role": "Marketing Lead", "prompt": "Think about the audience."},
  {"name": "Ivy", "role": "Engineer", "prompt": "Check feasibility."}
]
```"#;
        let records = use_case(reply)
            .execute("Plan a product launch timeline", &NoProgress)
            .await
            .unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].name, "Maya");
        assert!(records[0].is_coordinator);
        assert_eq!(records[0].archetype, Some(CoordinatorArchetype::Strategist));
        assert!(!records[1].is_coordinator);
        assert_eq!(records[2].model, Some(Model::default()));
    }

    #[tokio::test]
    async fn test_missing_key_fails_validation() {
        let reply = r#"[{"name": "Maya", "role": "Facilitator"}]"#;
        let err = use_case(reply).execute("Brainstorm names", &NoProgress).await.unwrap_err();
        match err {
            GenerateTeamError::ValidationFailed(message) => {
                assert!(message.contains("agent 1"));
                assert!(message.contains("\"prompt\""));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_prose_without_array_fails_validation() {
        let err = use_case("I cannot help with that.")
            .execute("Brainstorm names", &NoProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerateTeamError::ValidationFailed(_)));
    }

    #[tokio::test]
    async fn test_duplicate_names_are_configuration_invalid() {
        let reply = r#"[{"name": "Maya", "role": "Facilitator", "prompt": "a"},
                        {"name": "Maya", "role": "Analyst", "prompt": "b"}]"#;
        let err = use_case(reply).execute("Discuss pricing", &NoProgress).await.unwrap_err();
        assert!(matches!(
            err,
            GenerateTeamError::ConfigurationInvalid(DomainError::DuplicateAgentName(_))
        ));
    }
}
