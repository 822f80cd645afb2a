//! Ollama inference adapter.

mod gateway;
mod protocol;

pub use gateway::{DEFAULT_OLLAMA_URL, OllamaGateway};
