//! Agent response generation.
//!
//! [`AgentResponseGenerator`] binds one agent to the inference gateway and
//! applies the retry/timeout policy to every call it makes.

use crate::config::DiscussionParams;
use crate::ports::llm_gateway::{GatewayError, GenerateRequest, LlmGateway};
use crate::ports::progress::{ProgressNotifier, TokenSink};
use crate::use_cases::retry::{CallOutcome, RetryFailure, RetryPolicy, run_with_retry};
use crate::use_cases::shared::is_cancelled;
use std::sync::Arc;
use std::time::Duration;
use taskforce_domain::util::one_line;
use taskforce_domain::{
    Agent, ConversationLedger, DiscussionPrompt, StreamEvent, Topic, Turn, TurnContext,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Why an agent call produced no text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentCallError {
    #[error("{agent}: {operation} unavailable after {attempts} attempt(s): {cause}")]
    InferenceUnavailable {
        agent: String,
        operation: &'static str,
        attempts: u32,
        cause: GatewayError,
    },

    #[error("{agent}: {operation} failed: {cause}")]
    Terminal {
        agent: String,
        operation: &'static str,
        cause: GatewayError,
    },

    #[error("Operation cancelled")]
    Cancelled,
}

impl AgentCallError {
    fn from_retry(agent: &str, operation: &'static str, failure: RetryFailure) -> Self {
        match failure {
            RetryFailure::Exhausted { attempts, last } => AgentCallError::InferenceUnavailable {
                agent: agent.to_string(),
                operation,
                attempts,
                cause: last,
            },
            RetryFailure::Terminal { error, .. } => AgentCallError::Terminal {
                agent: agent.to_string(),
                operation,
                cause: error,
            },
            RetryFailure::Cancelled => AgentCallError::Cancelled,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, AgentCallError::Cancelled)
    }

    /// Operation that failed, e.g. `respond`.
    pub fn operation(&self) -> &'static str {
        match self {
            AgentCallError::InferenceUnavailable { operation, .. }
            | AgentCallError::Terminal { operation, .. } => operation,
            AgentCallError::Cancelled => "cancelled",
        }
    }

    /// Underlying cause as text.
    pub fn cause(&self) -> String {
        match self {
            AgentCallError::InferenceUnavailable {
                cause, attempts, ..
            } => format!("{cause} (after {attempts} attempts)"),
            AgentCallError::Terminal { cause, .. } => cause.to_string(),
            AgentCallError::Cancelled => "cancelled".to_string(),
        }
    }
}

/// Produces think/respond/stream output for one agent.
pub struct AgentResponseGenerator {
    agent: Agent,
    gateway: Arc<dyn LlmGateway>,
    retry: RetryPolicy,
    timeout: Duration,
    cancellation: Option<CancellationToken>,
}

impl AgentResponseGenerator {
    pub fn new(agent: Agent, gateway: Arc<dyn LlmGateway>, params: &DiscussionParams) -> Self {
        Self {
            agent,
            gateway,
            retry: params.retry,
            timeout: params.request_timeout,
            cancellation: None,
        }
    }

    /// Set cancellation token for graceful shutdown
    pub fn with_cancellation(mut self, token: Option<CancellationToken>) -> Self {
        self.cancellation = token;
        self
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn name(&self) -> &str {
        self.agent.name()
    }

    /// Private reasoning; never enters the transcript.
    pub async fn think(
        &self,
        topic: &Topic,
        ctx: &TurnContext,
        progress: &dyn ProgressNotifier,
    ) -> Result<String, AgentCallError> {
        let prompt = DiscussionPrompt::think(&self.agent, topic, ctx);
        self.complete("think", prompt, progress).await
    }

    /// Public turn, appended to the ledger on success.
    pub async fn respond(
        &self,
        topic: &Topic,
        ctx: &TurnContext,
        thinking: Option<&str>,
        ledger: &mut ConversationLedger,
        progress: &dyn ProgressNotifier,
    ) -> Result<Turn, AgentCallError> {
        let prompt = DiscussionPrompt::respond(&self.agent, topic, ctx, thinking);
        let text = self.complete("respond", prompt, progress).await?;
        Ok(self.record(ledger, text, ctx.round))
    }

    /// Public turn delivered chunk by chunk through `sink`.
    ///
    /// A failed attempt is restarted from scratch; `sink.on_restart` tells
    /// the consumer to drop what it already received.
    pub async fn stream_respond(
        &self,
        topic: &Topic,
        ctx: &TurnContext,
        thinking: Option<&str>,
        ledger: &mut ConversationLedger,
        sink: &dyn TokenSink,
        progress: &dyn ProgressNotifier,
    ) -> Result<Turn, AgentCallError> {
        info!("{} streaming response for round {}", self.name(), ctx.display_round());
        let prompt = DiscussionPrompt::respond(&self.agent, topic, ctx, thinking);
        let text = self.stream_complete("respond", prompt, sink, progress).await?;
        Ok(self.record(ledger, text, ctx.round))
    }

    /// Streamed generation under the retry policy. The sink sees exactly
    /// one of `on_complete` or `on_cancelled` unless a non-cancellation
    /// failure ends the call.
    pub async fn stream_complete(
        &self,
        operation: &'static str,
        prompt: String,
        sink: &dyn TokenSink,
        progress: &dyn ProgressNotifier,
    ) -> Result<String, AgentCallError> {
        let request = &GenerateRequest::new(self.agent.model().clone(), prompt, self.timeout);

        let result = run_with_retry(
            &self.retry,
            &self.cancellation,
            |attempt, error| progress.on_retry(self.name(), operation, attempt, error),
            |attempt| async move {
                if attempt > 1 {
                    sink.on_restart(attempt);
                }
                self.stream_once(request, sink).await
            },
        )
        .await;

        match result {
            Ok(text) => {
                sink.on_complete(&text);
                Ok(text)
            }
            Err(failure) => {
                if failure == RetryFailure::Cancelled {
                    sink.on_cancelled();
                }
                Err(AgentCallError::from_retry(self.name(), operation, failure))
            }
        }
    }

    /// One non-streamed generation under the retry policy.
    ///
    /// Also used by the coordinator phases and by repair cycles.
    pub async fn complete(
        &self,
        operation: &'static str,
        prompt: String,
        progress: &dyn ProgressNotifier,
    ) -> Result<String, AgentCallError> {
        let request = &GenerateRequest::new(self.agent.model().clone(), prompt, self.timeout);
        debug!("{} -> {} ({} bytes of prompt)", self.name(), operation, request.prompt.len());

        let result = run_with_retry(
            &self.retry,
            &self.cancellation,
            |attempt, error| progress.on_retry(self.name(), operation, attempt, error),
            |_| async move {
                match self.gateway.generate(request).await {
                    Ok(text) if text.trim().is_empty() => CallOutcome::Retryable(GatewayError::EmptyBody),
                    other => CallOutcome::from(other),
                }
            },
        )
        .await
        .map_err(|failure| AgentCallError::from_retry(self.name(), operation, failure))?;

        debug!("{} <- {}: {}", self.name(), operation, one_line(&result, 120));
        Ok(result)
    }

    async fn stream_once(&self, request: &GenerateRequest, sink: &dyn TokenSink) -> CallOutcome<String> {
        let mut handle = match self.gateway.stream_generate(request).await {
            Ok(handle) => handle,
            Err(e) => return CallOutcome::from(Err::<String, _>(e)),
        };

        let mut text = String::new();
        loop {
            if is_cancelled(&self.cancellation) {
                // The retry loop turns this into a cancellation.
                return CallOutcome::Terminal(GatewayError::Other("cancelled".to_string()));
            }
            let event = match tokio::time::timeout(self.timeout, handle.receiver.recv()).await {
                Ok(event) => event,
                Err(_) => return CallOutcome::Retryable(GatewayError::Timeout(self.timeout)),
            };
            match event {
                Some(StreamEvent::Delta(chunk)) => {
                    sink.on_chunk(&chunk);
                    text.push_str(&chunk);
                }
                Some(StreamEvent::Completed(full)) => {
                    if text.is_empty() && !full.is_empty() {
                        sink.on_chunk(&full);
                        text = full;
                    }
                    break;
                }
                Some(StreamEvent::Error(e)) => {
                    return CallOutcome::Retryable(GatewayError::StreamInterrupted(e));
                }
                None => break,
            }
        }

        if text.trim().is_empty() {
            CallOutcome::Retryable(GatewayError::EmptyBody)
        } else {
            CallOutcome::Success(text)
        }
    }

    fn record(&self, ledger: &mut ConversationLedger, text: String, round: usize) -> Turn {
        let turn = Turn::new(self.name(), text.trim(), round);
        ledger.append(turn.clone());
        turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::use_cases::test_support::{ScriptedGateway, Scripted};
    use std::sync::Mutex;
    use taskforce_domain::Model;

    fn params() -> DiscussionParams {
        DiscussionParams::default().with_retry(RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(10),
            multiplier: 2.0,
            max_backoff: Duration::from_millis(50),
        })
    }

    fn generator(gateway: Arc<ScriptedGateway>) -> AgentResponseGenerator {
        let agent = Agent::participant("Ada", "Engineer", "Be precise.", Model::default());
        AgentResponseGenerator::new(agent, gateway, &params())
    }

    fn topic() -> Topic {
        Topic::try_new("Bridge design").unwrap()
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<String>>,
    }

    impl TokenSink for RecordingSink {
        fn on_chunk(&self, chunk: &str) {
            self.events.lock().unwrap().push(format!("chunk:{chunk}"));
        }
        fn on_restart(&self, attempt: u32) {
            self.events.lock().unwrap().push(format!("restart:{attempt}"));
        }
        fn on_complete(&self, full_text: &str) {
            self.events.lock().unwrap().push(format!("done:{full_text}"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_respond_appends_exactly_one_turn() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Scripted::text("  Use steel.  ")]));
        let generator = generator(gateway.clone());
        let mut ledger = ConversationLedger::new();

        let turn = generator
            .respond(&topic(), &TurnContext::new(0, 1), None, &mut ledger, &NoProgress)
            .await
            .unwrap();

        assert_eq!(turn.text, "Use steel.");
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.windowed_history("Ada", 5).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_think_does_not_touch_ledger() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Scripted::text("hmm")]));
        let thinking = generator(gateway)
            .think(&topic(), &TurnContext::new(0, 1), &NoProgress)
            .await
            .unwrap();
        assert_eq!(thinking, "hmm");
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_are_retried() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Scripted::error(GatewayError::ConnectionFailed("refused".into())),
            Scripted::text(""),
            Scripted::text("Finally"),
        ]));
        let mut ledger = ConversationLedger::new();
        let turn = generator(gateway.clone())
            .respond(&topic(), &TurnContext::new(0, 1), None, &mut ledger, &NoProgress)
            .await
            .unwrap();
        assert_eq!(turn.text, "Finally");
        assert_eq!(gateway.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_is_inference_unavailable() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Scripted::error(GatewayError::Timeout(Duration::from_secs(30))),
            Scripted::error(GatewayError::Timeout(Duration::from_secs(30))),
            Scripted::error(GatewayError::Timeout(Duration::from_secs(30))),
        ]));
        let mut ledger = ConversationLedger::new();
        let err = generator(gateway)
            .respond(&topic(), &TurnContext::new(0, 1), None, &mut ledger, &NoProgress)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AgentCallError::InferenceUnavailable {
                attempts: 3,
                operation: "respond",
                ..
            }
        ));
        assert!(err.to_string().contains("Ada: respond unavailable after 3 attempt(s)"));
        assert!(ledger.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_respond_restarts_on_interrupted_stream() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Scripted::stream(vec![
                StreamEvent::Delta("Par".into()),
                StreamEvent::Error("connection reset".into()),
            ]),
            Scripted::stream(vec![
                StreamEvent::Delta("Full ".into()),
                StreamEvent::Delta("answer".into()),
                StreamEvent::Completed("Full answer".into()),
            ]),
        ]));
        let sink = RecordingSink::default();
        let mut ledger = ConversationLedger::new();

        let turn = generator(gateway)
            .stream_respond(
                &topic(),
                &TurnContext::new(1, 2),
                Some("notes"),
                &mut ledger,
                &sink,
                &NoProgress,
            )
            .await
            .unwrap();

        assert_eq!(turn.text, "Full answer");
        assert_eq!(turn.round, 1);
        assert_eq!(
            *sink.events.lock().unwrap(),
            vec![
                "chunk:Par",
                "restart:2",
                "chunk:Full ",
                "chunk:answer",
                "done:Full answer"
            ]
        );
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_call_appends_nothing() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Scripted::text("late")]));
        let token = CancellationToken::new();
        token.cancel();
        let generator = generator(gateway.clone()).with_cancellation(Some(token));
        let mut ledger = ConversationLedger::new();

        let err = generator
            .respond(&topic(), &TurnContext::new(0, 1), None, &mut ledger, &NoProgress)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert!(ledger.is_empty());
        assert_eq!(gateway.calls(), 0);
    }
}
