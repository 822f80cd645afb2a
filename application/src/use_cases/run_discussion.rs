//! Run Discussion use case
//!
//! Drives the round loop: every participant thinks, optionally consults the
//! knowledge source and then speaks, strictly one after another so later
//! speakers see earlier ones. The coordinator, when designated, plans before
//! round 0 and runs its boundary phases after every round.

use crate::config::DiscussionParams;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::knowledge::{KnowledgeCache, KnowledgeLookup, NoKnowledge};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{ProgressNotifier, ProgressSink};
use crate::use_cases::agent_responder::{AgentCallError, AgentResponseGenerator};
use crate::use_cases::coordinator::{CoordinatorError, CoordinatorStateMachine};
use crate::use_cases::shared::is_cancelled;
use std::sync::Arc;
use taskforce_domain::{
    DiscussionSession, DomainError, SessionStatus, TaskForce, Topic, TurnContext,
    find_lookup_term,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Errors that prevent a discussion from running to a terminal state.
///
/// Cancellation is not an error: the returned status is `Cancelled`.
#[derive(Error, Debug)]
pub enum RunDiscussionError {
    #[error(transparent)]
    ConfigurationInvalid(#[from] DomainError),

    #[error("Coordinator failed: {0}")]
    Coordinator(CoordinatorError),
}

/// Why the round loop stopped early.
enum Interrupt {
    Cancelled,
    Failed(RunDiscussionError),
}

impl From<CoordinatorError> for Interrupt {
    fn from(e: CoordinatorError) -> Self {
        match e {
            CoordinatorError::Cancelled => Interrupt::Cancelled,
            other => Interrupt::Failed(RunDiscussionError::Coordinator(other)),
        }
    }
}

fn checkpoint(token: &Option<CancellationToken>) -> Result<(), Interrupt> {
    if is_cancelled(token) {
        return Err(Interrupt::Cancelled);
    }
    Ok(())
}

/// Use case for running a multi-round discussion
pub struct RunDiscussionUseCase {
    gateway: Arc<dyn LlmGateway>,
    params: DiscussionParams,
    knowledge: Arc<dyn KnowledgeLookup>,
    logger: Arc<dyn ConversationLogger>,
    cancellation: Option<CancellationToken>,
}

impl RunDiscussionUseCase {
    pub fn new(gateway: Arc<dyn LlmGateway>, params: DiscussionParams) -> Self {
        Self {
            gateway,
            params,
            knowledge: Arc::new(NoKnowledge),
            logger: Arc::new(NoConversationLogger),
            cancellation: None,
        }
    }

    pub fn with_knowledge(mut self, knowledge: Arc<dyn KnowledgeLookup>) -> Self {
        self.knowledge = knowledge;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Set cancellation token for graceful shutdown
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn params(&self) -> &DiscussionParams {
        &self.params
    }

    /// Run `session` with `team` until all rounds are done or cancellation
    /// is observed. Returns the terminal status.
    pub async fn execute(
        &self,
        session: &mut DiscussionSession,
        team: &TaskForce,
        progress: &dyn ProgressNotifier,
    ) -> Result<SessionStatus, RunDiscussionError> {
        if team.participants().next().is_none() {
            return Err(DomainError::NoParticipants.into());
        }

        session.start(team)?;
        let snapshot = session.snapshot();
        let names: Vec<String> = team.agents().iter().map(|a| a.name().to_string()).collect();
        info!(
            "Starting discussion on \"{}\" with {} agents for {} rounds",
            session.topic(),
            names.len(),
            session.total_rounds()
        );
        progress.on_session_start(&snapshot);
        self.logger
            .log(ConversationEvent::session_started(&snapshot, &names));

        let result = self.run_rounds(session, team, progress).await;

        match result {
            Ok(()) => session.finish(),
            Err(Interrupt::Cancelled) => {
                info!(
                    "Discussion cancelled after {} completed round(s)",
                    session.current_round()
                );
                progress.on_cancel_requested();
                session.cancel();
            }
            Err(Interrupt::Failed(e)) => {
                warn!("Discussion aborted: {}", e);
                return Err(e);
            }
        }

        let snapshot = session.snapshot();
        progress.on_session_finished(&snapshot);
        self.logger
            .log(ConversationEvent::session_finished(&snapshot));
        Ok(session.status())
    }

    async fn run_rounds(
        &self,
        session: &mut DiscussionSession,
        team: &TaskForce,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), Interrupt> {
        let participants: Vec<AgentResponseGenerator> = team
            .participants()
            .map(|agent| {
                AgentResponseGenerator::new(agent.clone(), Arc::clone(&self.gateway), &self.params)
                    .with_cancellation(self.cancellation.clone())
            })
            .collect();
        let coordinator = team.coordinator().map(|agent| {
            let generator =
                AgentResponseGenerator::new(agent.clone(), Arc::clone(&self.gateway), &self.params);
            CoordinatorStateMachine::new(generator, &self.params)
                .with_cancellation(self.cancellation.clone())
        });
        let names = team.participant_names();
        let mut knowledge = KnowledgeCache::new(Arc::clone(&self.knowledge));

        if let Some(coordinator) = &coordinator {
            coordinator
                .plan(session, &names, progress, self.logger.as_ref())
                .await?;
        }

        let total_rounds = session.total_rounds();
        for round in 0..total_rounds {
            checkpoint(&self.cancellation)?;
            info!("Round {}/{}", round + 1, total_rounds);
            progress.on_round_start(round, total_rounds);

            for generator in &participants {
                checkpoint(&self.cancellation)?;
                self.take_turn(generator, session, round, &names, &mut knowledge, progress)
                    .await?;
            }

            if let Some(coordinator) = &coordinator {
                coordinator
                    .after_round(session, round, progress, self.logger.as_ref())
                    .await?;
            }

            session.complete_round();
            progress.on_round_complete(&session.snapshot());
        }

        Ok(())
    }

    /// Think, consult the knowledge source if asked to, then speak.
    ///
    /// A failed response becomes a placeholder; only cancellation stops
    /// the loop.
    async fn take_turn(
        &self,
        generator: &AgentResponseGenerator,
        session: &mut DiscussionSession,
        round: usize,
        names: &[String],
        knowledge: &mut KnowledgeCache,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), Interrupt> {
        let name = generator.name();
        let topic: Topic = session.topic().clone();
        let ctx = self.context(session, name, round, names);

        let thinking = match generator.think(&topic, &ctx, progress).await {
            Ok(thinking) => {
                progress.on_thinking(name, &thinking);
                Some(thinking)
            }
            Err(AgentCallError::Cancelled) => return Err(Interrupt::Cancelled),
            Err(e) => {
                warn!("{}; responding without private notes", e);
                None
            }
        };

        let note = match thinking.as_deref().and_then(find_lookup_term) {
            Some(term) => knowledge.lookup(&term).await,
            None => None,
        };
        if let Some(note) = &note {
            info!("{} consulted reference material on \"{}\"", name, note.term);
            progress.on_knowledge(name, note);
        }
        let ctx = ctx.with_knowledge(note);

        checkpoint(&self.cancellation)?;
        let ledger = session.ledger_mut();
        let result = if self.params.streaming {
            let sink = ProgressSink::new(name, progress);
            generator
                .stream_respond(&topic, &ctx, thinking.as_deref(), ledger, &sink, progress)
                .await
        } else {
            generator
                .respond(&topic, &ctx, thinking.as_deref(), ledger, progress)
                .await
        };

        match result {
            Ok(turn) => {
                progress.on_turn_appended(&turn);
                self.logger.log(ConversationEvent::turn_appended(&turn));
            }
            Err(AgentCallError::Cancelled) => return Err(Interrupt::Cancelled),
            Err(e) => {
                warn!("{}", e);
                let placeholder =
                    session
                        .ledger_mut()
                        .record_failure(name, round, e.operation(), e.cause());
                progress.on_turn_failed(&placeholder);
                self.logger.log(ConversationEvent::turn_failed(&placeholder));
            }
        }
        Ok(())
    }

    fn context(
        &self,
        session: &DiscussionSession,
        agent: &str,
        round: usize,
        names: &[String],
    ) -> TurnContext {
        let window = self.params.history_window;
        let ledger = session.ledger();
        let transcript = if self.params.isolate_rounds {
            ledger.windowed_transcript_before(round, window)
        } else {
            ledger.windowed_transcript(window)
        };
        TurnContext::new(round, session.total_rounds())
            .with_participants(names.to_vec())
            .with_transcript(transcript)
            .with_own_history(ledger.windowed_history(agent, window))
            .with_coordinator_digest(session.coordinator().and_then(|c| c.digest()))
    }
}
