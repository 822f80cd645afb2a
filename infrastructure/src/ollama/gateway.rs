//! Ollama implementation of the [`LlmGateway`] port.

use super::protocol::{
    GenerateBody, GenerateChunk, NdjsonBuffer, TagsResponse, decode_chunk, status_error,
};
use async_trait::async_trait;
use futures::StreamExt;
use std::time::Duration;
use taskforce_application::{GatewayError, GenerateRequest, LlmGateway, StreamHandle};
use taskforce_domain::{Model, StreamEvent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

const TAGS_TIMEOUT: Duration = Duration::from_secs(5);
const STREAM_BUFFER: usize = 64;

/// Talks to an Ollama server over HTTP.
pub struct OllamaGateway {
    client: reqwest::Client,
    base_url: String,
    fallback_models: Vec<Model>,
}

impl OllamaGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            fallback_models: Model::default_models(),
        }
    }

    /// Models reported by [`available_models`](LlmGateway::available_models)
    /// when the server cannot be asked.
    pub fn with_fallback_models(mut self, models: Vec<Model>) -> Self {
        self.fallback_models = models;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Query `/api/tags` without falling back.
    pub async fn list_models(&self) -> Result<Vec<Model>, GatewayError> {
        let response = self
            .client
            .get(self.endpoint("/api/tags"))
            .timeout(TAGS_TIMEOUT)
            .send()
            .await
            .map_err(|e| send_error(e, TAGS_TIMEOUT))?;
        let response = check_status(response).await?;
        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Decode(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| Model::new(m.name)).collect())
    }

    async fn post_generate(
        &self,
        request: &GenerateRequest,
        stream: bool,
    ) -> Result<reqwest::Response, GatewayError> {
        let body = GenerateBody {
            model: request.model.as_str(),
            prompt: &request.prompt,
            stream,
        };
        debug!(
            "POST /api/generate model={} stream={} prompt_bytes={}",
            request.model,
            stream,
            request.prompt.len()
        );
        let builder = self.client.post(self.endpoint("/api/generate")).json(&body);

        let response = if stream {
            // The whole body may legitimately take longer than the timeout;
            // only waiting for the headers is bounded here.
            match tokio::time::timeout(request.timeout, builder.send()).await {
                Ok(result) => result.map_err(|e| send_error(e, request.timeout))?,
                Err(_) => return Err(GatewayError::Timeout(request.timeout)),
            }
        } else {
            builder
                .timeout(request.timeout)
                .send()
                .await
                .map_err(|e| send_error(e, request.timeout))?
        };
        check_status(response).await
    }
}

fn send_error(e: reqwest::Error, timeout: Duration) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout(timeout)
    } else if e.is_connect() {
        GatewayError::ConnectionFailed(e.to_string())
    } else if e.is_decode() || e.is_body() {
        GatewayError::StreamInterrupted(e.to_string())
    } else {
        GatewayError::Other(e.to_string())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status.as_u16(), &body))
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, GatewayError> {
        let response = self.post_generate(request, false).await?;
        let body = response
            .text()
            .await
            .map_err(|e| send_error(e, request.timeout))?;
        if body.trim().is_empty() {
            return Err(GatewayError::EmptyBody);
        }

        let chunk = decode_chunk(&body)?;
        if let Some(error) = chunk.error {
            return Err(GatewayError::Other(error));
        }
        if chunk.response.trim().is_empty() {
            return Err(GatewayError::EmptyBody);
        }
        Ok(chunk.response)
    }

    async fn stream_generate(&self, request: &GenerateRequest) -> Result<StreamHandle, GatewayError> {
        let response = self.post_generate(request, true).await?;
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);

        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut buffer = NdjsonBuffer::new();
            let mut full_text = String::new();

            while let Some(item) = bytes.next().await {
                let data = match item {
                    Ok(data) => data,
                    Err(e) => {
                        let _ = tx.send(StreamEvent::Error(e.to_string())).await;
                        return;
                    }
                };
                for chunk in buffer.push(&data) {
                    if !forward(&tx, chunk, &mut full_text).await {
                        return;
                    }
                }
            }

            if let Some(chunk) = buffer.finish()
                && !forward(&tx, chunk, &mut full_text).await
            {
                return;
            }
            let _ = tx
                .send(StreamEvent::Error("stream ended before completion".to_string()))
                .await;
        });

        Ok(StreamHandle::new(rx))
    }

    async fn available_models(&self) -> Result<Vec<Model>, GatewayError> {
        match self.list_models().await {
            Ok(models) if !models.is_empty() => {
                info!("Ollama reports {} installed model(s)", models.len());
                Ok(models)
            }
            Ok(_) => {
                warn!("Ollama reports no installed models; using defaults");
                Ok(self.fallback_models.clone())
            }
            Err(e) => {
                warn!("Could not list Ollama models ({}); using defaults", e);
                Ok(self.fallback_models.clone())
            }
        }
    }
}

/// Send one decoded line on. Returns false once the stream is over, either
/// because it completed, failed, or nobody is listening any more.
async fn forward(
    tx: &mpsc::Sender<StreamEvent>,
    chunk: Result<GenerateChunk, GatewayError>,
    full_text: &mut String,
) -> bool {
    let chunk = match chunk {
        Ok(chunk) => chunk,
        Err(e) => {
            let _ = tx.send(StreamEvent::Error(e.to_string())).await;
            return false;
        }
    };
    if let Some(error) = chunk.error {
        let _ = tx.send(StreamEvent::Error(error)).await;
        return false;
    }
    if !chunk.response.is_empty() {
        full_text.push_str(&chunk.response);
        if tx.send(StreamEvent::Delta(chunk.response)).await.is_err() {
            return false;
        }
    }
    if chunk.done {
        let _ = tx
            .send(StreamEvent::Completed(std::mem::take(full_text)))
            .await;
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response and close the connection.
    async fn serve_once(status: &'static str, body: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = vec![0u8; 8192];
            let _ = socket.read(&mut request).await;
            let reply = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}")
    }

    fn request() -> GenerateRequest {
        GenerateRequest::new(Model::default(), "Hello", Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_generate_returns_response_field() {
        let url = serve_once("200 OK", r#"{"response":"Hi there","done":true}"#.into()).await;
        let text = OllamaGateway::new(url).generate(&request()).await.unwrap();
        assert_eq!(text, "Hi there");
    }

    #[tokio::test]
    async fn test_generate_empty_response_is_transient() {
        let url = serve_once("200 OK", r#"{"response":"","done":true}"#.into()).await;
        let err = OllamaGateway::new(url).generate(&request()).await.unwrap_err();
        assert_eq!(err, GatewayError::EmptyBody);
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_unknown_model_is_terminal() {
        let url = serve_once("404 Not Found", r#"{"error":"model 'x' not found"}"#.into()).await;
        let err = OllamaGateway::new(url).generate(&request()).await.unwrap_err();
        assert!(matches!(err, GatewayError::ModelNotAvailable(_)));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_refused_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = OllamaGateway::new(format!("http://{addr}"))
            .generate(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn test_stream_generate_emits_deltas_then_completed() {
        let body = [
            r#"{"response":"Hel","done":false}"#,
            r#"{"response":"lo","done":false}"#,
            r#"{"response":"","done":true}"#,
        ]
        .join("\n")
            + "\n";
        let url = serve_once("200 OK", body).await;

        let mut handle = OllamaGateway::new(url).stream_generate(&request()).await.unwrap();
        let mut events = Vec::new();
        while let Some(event) = handle.receiver.recv().await {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                StreamEvent::Delta("Hel".into()),
                StreamEvent::Delta("lo".into()),
                StreamEvent::Completed("Hello".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_truncated_stream_reports_error() {
        let url = serve_once("200 OK", "{\"response\":\"Hel\",\"done\":false}\n".into()).await;
        let handle = OllamaGateway::new(url).stream_generate(&request()).await.unwrap();
        assert!(matches!(
            handle.collect_text().await,
            Err(GatewayError::StreamInterrupted(_))
        ));
    }

    #[tokio::test]
    async fn test_available_models_falls_back_when_unreachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let models = OllamaGateway::new(format!("http://{addr}"))
            .with_fallback_models(vec![Model::new("mistral:7b")])
            .available_models()
            .await
            .unwrap();
        assert_eq!(models, vec![Model::new("mistral:7b")]);
    }

    #[tokio::test]
    async fn test_list_models_reads_tags() {
        let url = serve_once("200 OK", r#"{"models":[{"name":"phi3:mini"}]}"#.into()).await;
        let models = OllamaGateway::new(url).list_models().await.unwrap();
        assert_eq!(models, vec![Model::new("phi3:mini")]);
    }
}
