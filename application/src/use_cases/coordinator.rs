//! Coordinator state machine.
//!
//! Runs the coordinator's phases at the points the orchestrator chooses:
//! PLANNING before round 0, TRACKING + ADJUSTING after every round but the
//! last, SUMMARIZING + DECIDING after the last one. Each phase produces an
//! [`Artifact`], degraded when parsing or inference fails; only a phase
//! sequencing error or cancellation stops the coordinator.

use crate::config::DiscussionParams;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::progress::{ProgressNotifier, ProgressSink};
use crate::use_cases::agent_responder::{AgentCallError, AgentResponseGenerator};
use crate::use_cases::shared::is_cancelled;
use crate::use_cases::structured_output::StructuredOutputParser;
use serde::Serialize;
use serde::de::DeserializeOwned;
use taskforce_domain::{
    Artifact, CoordinatorPhase, CoordinatorPrompt, CoordinatorRecord, DiscussionSession,
    PhaseTransitionError, PlanAdjustment, ProgressReport, ProjectPlan, Schema, Turn,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Conditions that stop the coordinator; everything else degrades.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error(transparent)]
    Phase(#[from] PhaseTransitionError),

    #[error("session has no coordinator record")]
    Detached,

    #[error("Operation cancelled")]
    Cancelled,
}

pub struct CoordinatorStateMachine {
    generator: AgentResponseGenerator,
    parser: StructuredOutputParser,
    streaming: bool,
    final_response: bool,
    cancellation: Option<CancellationToken>,
}

impl CoordinatorStateMachine {
    pub fn new(generator: AgentResponseGenerator, params: &DiscussionParams) -> Self {
        Self {
            generator,
            parser: StructuredOutputParser::new(params.repair_attempts),
            streaming: params.streaming,
            final_response: params.final_response,
            cancellation: None,
        }
    }

    /// Set cancellation token for graceful shutdown
    pub fn with_cancellation(mut self, token: Option<CancellationToken>) -> Self {
        self.generator = self.generator.with_cancellation(token.clone());
        self.cancellation = token;
        self
    }

    pub fn name(&self) -> &str {
        self.generator.name()
    }

    /// PLANNING, before the first round.
    pub async fn plan(
        &self,
        session: &mut DiscussionSession,
        participants: &[String],
        progress: &dyn ProgressNotifier,
        logger: &dyn ConversationLogger,
    ) -> Result<(), CoordinatorError> {
        self.enter(session, CoordinatorPhase::Planning, None, progress)?;

        let prompt = CoordinatorPrompt::plan(
            self.generator.agent(),
            session.topic(),
            participants,
            session.total_rounds(),
        );
        let plan: Artifact<ProjectPlan> = self
            .structured("plan", prompt, &Schema::project_plan(), progress, logger)
            .await?;

        self.finish_phase(CoordinatorPhase::Planning, None, &plan, progress, logger);
        record(session)?.set_plan(plan);
        Ok(())
    }

    /// Run the phases that belong to the boundary after `round`.
    pub async fn after_round(
        &self,
        session: &mut DiscussionSession,
        round: usize,
        progress: &dyn ProgressNotifier,
        logger: &dyn ConversationLogger,
    ) -> Result<(), CoordinatorError> {
        match CoordinatorPhase::after_round(round, session.total_rounds()) {
            [CoordinatorPhase::Tracking, _] => {
                self.track(session, round, progress, logger).await?;
                self.adjust(session, round, progress, logger).await
            }
            _ => {
                self.summarize(session, round, progress, logger).await?;
                self.decide(session, round, progress, logger).await
            }
        }
    }

    /// TRACKING: progress report for the round that just ended.
    pub async fn track(
        &self,
        session: &mut DiscussionSession,
        round: usize,
        progress: &dyn ProgressNotifier,
        logger: &dyn ConversationLogger,
    ) -> Result<(), CoordinatorError> {
        let phase = CoordinatorPhase::Tracking;
        self.enter(session, phase, Some(round), progress)?;

        let round_turns: Vec<Turn> = session.ledger().turns_in_round(round).cloned().collect();
        let plan_digest = record(session)?
            .plan()
            .and_then(Artifact::value)
            .map(ProjectPlan::digest);
        let prompt = CoordinatorPrompt::progress(
            self.generator.agent(),
            session.topic(),
            plan_digest.as_deref(),
            &round_turns,
            round + 1,
            session.total_rounds(),
        );
        let mut report: Artifact<ProgressReport> = self
            .structured("track", prompt, &Schema::progress_report(), progress, logger)
            .await?;

        // Round numbers come from the session, not from the model.
        if let Some(value) = report.value_mut() {
            value.round = round + 1;
            value.total_rounds = session.total_rounds();
        }

        self.finish_phase(phase, Some(round), &report, progress, logger);
        record(session)?.record_report(report);
        Ok(())
    }

    /// ADJUSTING: plan changes derived from the latest report.
    pub async fn adjust(
        &self,
        session: &mut DiscussionSession,
        round: usize,
        progress: &dyn ProgressNotifier,
        logger: &dyn ConversationLogger,
    ) -> Result<(), CoordinatorError> {
        let phase = CoordinatorPhase::Adjusting;
        self.enter(session, phase, Some(round), progress)?;

        let current = record(session)?;
        let plan_json = current
            .plan()
            .and_then(Artifact::value)
            .and_then(|plan| serde_json::to_string_pretty(plan).ok());
        let report_digest = current
            .latest_report()
            .and_then(Artifact::value)
            .map(ProgressReport::digest);
        let prompt = CoordinatorPrompt::adjust(
            self.generator.agent(),
            plan_json.as_deref(),
            report_digest.as_deref(),
        );
        let adjustment: Artifact<PlanAdjustment> = self
            .structured("adjust", prompt, &Schema::plan_adjustment(), progress, logger)
            .await?;

        self.finish_phase(phase, Some(round), &adjustment, progress, logger);
        let applied = record(session)?.record_adjustment(adjustment);
        info!("Applied {} plan change(s) after round {}", applied, round + 1);
        Ok(())
    }

    /// SUMMARIZING: summary of the whole transcript.
    pub async fn summarize(
        &self,
        session: &mut DiscussionSession,
        round: usize,
        progress: &dyn ProgressNotifier,
        logger: &dyn ConversationLogger,
    ) -> Result<(), CoordinatorError> {
        let phase = CoordinatorPhase::Summarizing;
        self.enter(session, phase, Some(round), progress)?;

        let prompt =
            CoordinatorPrompt::summarize(self.generator.agent(), session.topic(), session.transcript());
        let summary = self.text("summarize", prompt, progress).await?;

        self.finish_phase(phase, Some(round), &summary, progress, logger);
        record(session)?.set_summary(summary);
        Ok(())
    }

    /// DECIDING: final assessment, FinalOutput and, if enabled, the final
    /// response. Ends in DONE.
    pub async fn decide(
        &self,
        session: &mut DiscussionSession,
        round: usize,
        progress: &dyn ProgressNotifier,
        logger: &dyn ConversationLogger,
    ) -> Result<(), CoordinatorError> {
        let phase = CoordinatorPhase::Deciding;
        self.enter(session, phase, Some(round), progress)?;

        let summary = record(session)?
            .summary()
            .map(Artifact::text)
            .unwrap_or_default();
        let prompt = CoordinatorPrompt::decide(
            self.generator.agent(),
            session.topic(),
            session.transcript(),
            &summary,
        );
        let decision = self.text("decide", prompt, progress).await?;
        let decision_text = decision.text();

        self.finish_phase(phase, Some(round), &decision, progress, logger);
        record(session)?.compose_final(decision);

        if self.final_response {
            check(&self.cancellation)?;
            let prompt = CoordinatorPrompt::final_response(
                self.generator.agent(),
                session.topic(),
                session.transcript(),
                &decision_text,
            );
            match self.respond_final(prompt, progress).await {
                Ok(text) => record(session)?.attach_final_response(text.trim().to_string()),
                Err(AgentCallError::Cancelled) => return Err(CoordinatorError::Cancelled),
                Err(e) => warn!("Final response unavailable: {}", e),
            }
        }

        record(session)?.enter(CoordinatorPhase::Done, None)?;
        progress.on_coordinator_phase_start(CoordinatorPhase::Done, None);
        info!("Coordinator {} done", self.name());
        Ok(())
    }

    async fn respond_final(
        &self,
        prompt: String,
        progress: &dyn ProgressNotifier,
    ) -> Result<String, AgentCallError> {
        if self.streaming {
            let sink = ProgressSink::new(self.name(), progress);
            self.generator
                .stream_complete("final_response", prompt, &sink, progress)
                .await
        } else {
            self.generator.complete("final_response", prompt, progress).await
        }
    }

    fn enter(
        &self,
        session: &mut DiscussionSession,
        phase: CoordinatorPhase,
        round: Option<usize>,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), CoordinatorError> {
        check(&self.cancellation)?;
        record(session)?.enter(phase, round)?;
        info!("Coordinator {} entering {}", self.name(), phase);
        progress.on_coordinator_phase_start(phase, round);
        Ok(())
    }

    fn finish_phase<T: Serialize>(
        &self,
        phase: CoordinatorPhase,
        round: Option<usize>,
        artifact: &Artifact<T>,
        progress: &dyn ProgressNotifier,
        logger: &dyn ConversationLogger,
    ) {
        if artifact.is_degraded() {
            warn!("{} produced a degraded artifact ({})", phase, artifact.status());
        }
        logger.log(ConversationEvent::coordinator_phase(
            phase,
            round,
            artifact.status(),
            serde_json::to_value(artifact).unwrap_or_default(),
        ));
        progress.on_coordinator_phase_complete(phase, round, artifact.is_degraded());
    }

    async fn structured<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        prompt: String,
        schema: &Schema,
        progress: &dyn ProgressNotifier,
        logger: &dyn ConversationLogger,
    ) -> Result<Artifact<T>, CoordinatorError> {
        let result = self
            .parser
            .obtain(&self.generator, operation, prompt, schema, progress, logger)
            .await;
        degrade(operation, result)
    }

    async fn text(
        &self,
        operation: &'static str,
        prompt: String,
        progress: &dyn ProgressNotifier,
    ) -> Result<Artifact<String>, CoordinatorError> {
        let result = self
            .generator
            .complete(operation, prompt, progress)
            .await
            .map(|text| Artifact::parsed(text.trim().to_string()));
        degrade(operation, result)
    }
}

fn record(session: &mut DiscussionSession) -> Result<&mut CoordinatorRecord, CoordinatorError> {
    session.coordinator_mut().ok_or(CoordinatorError::Detached)
}

fn check(token: &Option<CancellationToken>) -> Result<(), CoordinatorError> {
    if is_cancelled(token) {
        return Err(CoordinatorError::Cancelled);
    }
    Ok(())
}

/// Inference failures become an unavailable artifact; cancellation stops.
fn degrade<T>(
    operation: &'static str,
    result: Result<Artifact<T>, AgentCallError>,
) -> Result<Artifact<T>, CoordinatorError> {
    match result {
        Ok(artifact) => Ok(artifact),
        Err(AgentCallError::Cancelled) => Err(CoordinatorError::Cancelled),
        Err(e) => {
            warn!("Coordinator {} failed: {}", operation, e);
            Ok(Artifact::Unavailable {
                operation: operation.to_string(),
                cause: e.cause(),
            })
        }
    }
}
