//! Scripted gateway for use-case tests.

use crate::ports::llm_gateway::{GatewayError, GenerateRequest, LlmGateway, StreamHandle};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use taskforce_domain::{Model, StreamEvent};
use tokio::sync::mpsc;

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum Scripted {
    Text(String),
    Error(GatewayError),
    Stream(Vec<StreamEvent>),
}

impl Scripted {
    pub fn text(text: impl Into<String>) -> Self {
        Scripted::Text(text.into())
    }

    pub fn error(error: GatewayError) -> Self {
        Scripted::Error(error)
    }

    pub fn stream(events: Vec<StreamEvent>) -> Self {
        Scripted::Stream(events)
    }
}

type Handler = Box<dyn Fn(&GenerateRequest) -> Scripted + Send + Sync>;

/// Replies from a queue first, then from an optional prompt-based handler.
pub struct ScriptedGateway {
    queue: Mutex<VecDeque<Scripted>>,
    handler: Option<Handler>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn new(replies: Vec<Scripted>) -> Self {
        Self {
            queue: Mutex::new(replies.into()),
            handler: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_handler(
        handler: impl Fn(&GenerateRequest) -> Scripted + Send + Sync + 'static,
    ) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            handler: Some(Box::new(handler)),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next(&self, request: &GenerateRequest) -> Scripted {
        self.prompts.lock().unwrap().push(request.prompt.clone());
        if let Some(reply) = self.queue.lock().unwrap().pop_front() {
            return reply;
        }
        match &self.handler {
            Some(handler) => handler(request),
            None => Scripted::Error(GatewayError::Other("script exhausted".into())),
        }
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GatewayError> {
        match self.next(request) {
            Scripted::Text(text) => Ok(text),
            Scripted::Error(e) => Err(e),
            Scripted::Stream(events) => {
                let (tx, rx) = mpsc::channel(events.len().max(1));
                for event in events {
                    let _ = tx.send(event).await;
                }
                drop(tx);
                StreamHandle::new(rx).collect_text().await
            }
        }
    }

    async fn stream_generate(&self, request: &GenerateRequest) -> Result<StreamHandle, GatewayError> {
        let events = match self.next(request) {
            Scripted::Text(text) => vec![StreamEvent::Delta(text.clone()), StreamEvent::Completed(text)],
            Scripted::Error(e) => return Err(e),
            Scripted::Stream(events) => events,
        };
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            let _ = tx.send(event).await;
        }
        Ok(StreamHandle::new(rx))
    }

    async fn available_models(&self) -> Result<Vec<Model>, GatewayError> {
        Ok(vec![Model::default()])
    }
}
