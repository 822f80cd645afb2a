//! Ollama wire format.
//!
//! `/api/generate` answers with one JSON object, or with newline-delimited
//! JSON objects when streaming; each carries a `response` fragment and the
//! last one has `done: true`. `/api/tags` lists installed models.

use serde::{Deserialize, Serialize};
use taskforce_application::GatewayError;

#[derive(Debug, Serialize)]
pub struct GenerateBody<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerateChunk {
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TagEntry {
    pub name: String,
}

pub fn decode_chunk(line: &str) -> Result<GenerateChunk, GatewayError> {
    serde_json::from_str(line.trim()).map_err(|e| GatewayError::Decode(e.to_string()))
}

/// Map a non-2xx reply. Ollama reports unknown models as 404 with an
/// `{"error": "model '...' not found"}` body.
pub fn status_error(status: u16, body: &str) -> GatewayError {
    let message = serde_json::from_str::<GenerateChunk>(body)
        .ok()
        .and_then(|c| c.error)
        .unwrap_or_else(|| body.trim().to_string());
    if status == 404 && message.contains("not found") {
        GatewayError::ModelNotAvailable(message)
    } else {
        GatewayError::HttpStatus {
            status,
            body: message,
        }
    }
}

/// Reassembles NDJSON lines from arbitrarily split byte chunks.
#[derive(Debug, Default)]
pub struct NdjsonBuffer {
    pending: Vec<u8>,
}

impl NdjsonBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes; returns every line completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Result<GenerateChunk, GatewayError>> {
        self.pending.extend_from_slice(bytes);
        let mut out = Vec::new();
        while let Some(end) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=end).collect();
            if let Some(chunk) = decode_bytes(&line) {
                out.push(chunk);
            }
        }
        out
    }

    /// Decode a trailing line that was not newline-terminated.
    pub fn finish(&mut self) -> Option<Result<GenerateChunk, GatewayError>> {
        let rest = std::mem::take(&mut self.pending);
        decode_bytes(&rest)
    }
}

fn decode_bytes(line: &[u8]) -> Option<Result<GenerateChunk, GatewayError>> {
    let text = String::from_utf8_lossy(line);
    if text.trim().is_empty() {
        None
    } else {
        Some(decode_chunk(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_serializes_as_ollama_expects() {
        let body = GenerateBody {
            model: "llama3:latest",
            prompt: "Hi",
            stream: false,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"model":"llama3:latest","prompt":"Hi","stream":false}"#
        );
    }

    #[test]
    fn test_lines_split_across_chunks() {
        let mut buffer = NdjsonBuffer::new();
        assert!(buffer.push(br#"{"response":"Hel"#).is_empty());

        let chunks = buffer.push(b"lo\",\"done\":false}\n{\"response\":\" world\"}\n{\"done\":");
        let texts: Vec<String> = chunks.into_iter().map(|c| c.unwrap().response).collect();
        assert_eq!(texts, vec!["Hello", " world"]);

        let last = buffer.push(b"true}\n");
        assert!(last[0].as_ref().unwrap().done);
        assert!(buffer.finish().is_none());
    }

    #[test]
    fn test_multibyte_character_split_between_chunks() {
        let line = "{\"response\":\"caf\u{e9}\"}\n".as_bytes();
        let (head, tail) = line.split_at(line.len() - 4);
        let mut buffer = NdjsonBuffer::new();
        assert!(buffer.push(head).is_empty());
        let chunks = buffer.push(tail);
        assert_eq!(chunks[0].as_ref().unwrap().response, "caf\u{e9}");
    }

    #[test]
    fn test_unterminated_final_line() {
        let mut buffer = NdjsonBuffer::new();
        buffer.push(br#"{"response":"x","done":true}"#);
        assert!(buffer.finish().unwrap().unwrap().done);
    }

    #[test]
    fn test_garbage_line_is_decode_error() {
        let mut buffer = NdjsonBuffer::new();
        let chunks = buffer.push(b"<html>\n");
        assert!(matches!(chunks[0], Err(GatewayError::Decode(_))));
    }

    #[test]
    fn test_status_error_mapping() {
        assert_eq!(
            status_error(404, r#"{"error":"model 'nope' not found"}"#),
            GatewayError::ModelNotAvailable("model 'nope' not found".into())
        );
        assert_eq!(
            status_error(500, "boom\n"),
            GatewayError::HttpStatus {
                status: 500,
                body: "boom".into()
            }
        );
    }

    #[test]
    fn test_tags_response() {
        let tags: TagsResponse =
            serde_json::from_str(r#"{"models":[{"name":"llama3:latest","size":1},{"name":"mistral:7b"}]}"#)
                .unwrap();
        let names: Vec<_> = tags.models.into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["llama3:latest", "mistral:7b"]);
    }
}
