//! LLM Gateway port
//!
//! Defines the interface for communicating with the inference service.

use async_trait::async_trait;
use std::time::Duration;
use taskforce_domain::{Model, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during inference calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("empty response body")]
    EmptyBody,

    #[error("could not decode response: {0}")]
    Decode(String),

    #[error("model not available: {0}")]
    ModelNotAvailable(String),

    #[error("stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("{0}")]
    Other(String),
}

impl GatewayError {
    /// Whether retrying the same request may succeed.
    ///
    /// Timeouts, refused connections, interrupted streams, empty bodies,
    /// 5xx and 429 are transient; everything else is terminal.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Timeout(_)
            | GatewayError::ConnectionFailed(_)
            | GatewayError::EmptyBody
            | GatewayError::StreamInterrupted(_) => true,
            GatewayError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            GatewayError::Decode(_) | GatewayError::ModelNotAvailable(_) | GatewayError::Other(_) => {
                false
            }
        }
    }
}

/// One generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub model: Model,
    pub prompt: String,
    pub timeout: Duration,
}

impl GenerateRequest {
    pub fn new(model: Model, prompt: impl Into<String>, timeout: Duration) -> Self {
        Self {
            model,
            prompt: prompt.into(),
            timeout,
        }
    }
}

/// Gateway to the inference service
///
/// This port defines how the application layer talks to the model server.
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Generate a complete response.
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GatewayError>;

    /// Generate a response as a stream of events.
    ///
    /// Default implementation calls `generate()` and wraps the result in a
    /// single `Completed` event.
    async fn stream_generate(&self, request: &GenerateRequest) -> Result<StreamHandle, GatewayError> {
        let result = self.generate(request).await?;
        let (tx, rx) = mpsc::channel(1);
        // If the receiver is already gone nobody wants the text.
        let _ = tx.send(StreamEvent::Completed(result)).await;
        Ok(StreamHandle::new(rx))
    }

    /// Models installed on the server.
    async fn available_models(&self) -> Result<Vec<Model>, GatewayError>;
}

/// Handle for receiving streaming events.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` and provides convenience methods
/// for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(mut self) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => full_text.push_str(&chunk),
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => return Err(GatewayError::StreamInterrupted(e)),
            }
        }
        // Channel closed without Completed; keep what arrived.
        Ok(full_text)
    }
}
