//! Structured output with bounded repair.
//!
//! A reply is extracted, validated against a [`Schema`] and deserialized.
//! On failure the same agent is shown its reply and the list of problems,
//! at most `max_repairs` times. After that the raw text is kept as an
//! [`Artifact::Unparsed`] so the discussion can go on.

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::progress::ProgressNotifier;
use crate::use_cases::agent_responder::{AgentCallError, AgentResponseGenerator};
use serde::de::DeserializeOwned;
use serde_json::Value;
use taskforce_domain::{Artifact, RepairPrompt, Schema, SchemaIssue, extract_validated};
use tracing::{debug, warn};

pub struct StructuredOutputParser {
    max_repairs: usize,
}

impl StructuredOutputParser {
    pub fn new(max_repairs: usize) -> Self {
        Self { max_repairs }
    }

    pub fn max_repairs(&self) -> usize {
        self.max_repairs
    }

    /// Parse one reply without asking for repairs.
    pub fn parse<T: DeserializeOwned>(text: &str, schema: &Schema) -> Result<T, Vec<SchemaIssue>> {
        let object = extract_validated(text, schema)?;
        serde_json::from_value(Value::Object(object)).map_err(|e| {
            vec![SchemaIssue::Malformed {
                detail: e.to_string(),
            }]
        })
    }

    /// Ask `generator` for a structured reply and repair it if needed.
    ///
    /// Only a failure of the initial call is an error; a failed repair call
    /// degrades to the last raw text.
    pub async fn obtain<T: DeserializeOwned>(
        &self,
        generator: &AgentResponseGenerator,
        operation: &'static str,
        prompt: String,
        schema: &Schema,
        progress: &dyn ProgressNotifier,
        logger: &dyn ConversationLogger,
    ) -> Result<Artifact<T>, AgentCallError> {
        let raw = generator.complete(operation, prompt, progress).await?;
        self.settle(generator, raw, schema, progress, logger).await
    }

    /// Turn an already obtained reply into an artifact, repairing as needed.
    pub async fn settle<T: DeserializeOwned>(
        &self,
        generator: &AgentResponseGenerator,
        mut raw: String,
        schema: &Schema,
        progress: &dyn ProgressNotifier,
        logger: &dyn ConversationLogger,
    ) -> Result<Artifact<T>, AgentCallError> {
        let mut cycles = 0;
        loop {
            let issues = match Self::parse::<T>(&raw, schema) {
                Ok(value) => {
                    debug!("{} parsed after {} repair cycle(s)", schema.name(), cycles);
                    return Ok(Artifact::Parsed {
                        value,
                        repair_cycles: cycles,
                    });
                }
                Err(issues) => issues,
            };

            if cycles >= self.max_repairs {
                warn!(
                    "{} from {} still invalid after {} repair cycle(s); keeping raw text",
                    schema.name(),
                    generator.name(),
                    cycles
                );
                return Ok(unparsed(raw, &issues, cycles));
            }

            cycles += 1;
            progress.on_repair_cycle(schema.name(), cycles, &issues);
            logger.log(ConversationEvent::repair_cycle(
                schema.name(),
                cycles,
                &describe(&issues),
            ));

            let prompt = RepairPrompt::repair(schema, &raw, &issues);
            match generator.complete("repair", prompt, progress).await {
                Ok(text) => raw = text,
                Err(AgentCallError::Cancelled) => return Err(AgentCallError::Cancelled),
                Err(e) => {
                    warn!("Repair call failed: {}", e);
                    return Ok(unparsed(raw, &issues, cycles));
                }
            }
        }
    }
}

fn describe(issues: &[SchemaIssue]) -> Vec<String> {
    issues.iter().map(ToString::to_string).collect()
}

fn unparsed<T>(raw: String, issues: &[SchemaIssue], repair_cycles: usize) -> Artifact<T> {
    Artifact::Unparsed {
        raw,
        issues: describe(issues),
        repair_cycles,
    }
}
