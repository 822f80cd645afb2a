use serde::{Deserialize, Serialize};

/// `[wikipedia]`: knowledge lookups requested from agent thinking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileWikipediaConfig {
    pub enabled: bool,
    pub language: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub max_summary_chars: usize,
}

impl Default for FileWikipediaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "en".to_string(),
            user_agent: "MultiAgentDiscussionSystem/0.1".to_string(),
            timeout_secs: 15,
            max_summary_chars: 750,
        }
    }
}
