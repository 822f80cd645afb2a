use serde::{Deserialize, Serialize};
use taskforce_domain::DEFAULT_MODEL;

/// `[ollama]`: where the inference server lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOllamaConfig {
    pub url: String,
    /// Per-request timeout, also used as the idle timeout between stream chunks.
    pub timeout_secs: u64,
    /// Model for agents whose record does not name one.
    pub default_model: String,
}

impl Default for FileOllamaConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:11434".to_string(),
            timeout_secs: 30,
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}
