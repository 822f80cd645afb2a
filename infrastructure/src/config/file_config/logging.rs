use serde::{Deserialize, Serialize};

/// `[logging]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL transcript of discussion events.
    pub conversation_log: Option<String>,
    /// Diagnostic log file, written in addition to stderr.
    pub file: Option<String>,
}
