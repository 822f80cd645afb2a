//! Raw TOML configuration data types
//!
//! These structs mirror the config file section by section. Every field has
//! a default, so a partial file (or none at all) is valid input.

mod discussion;
mod logging;
mod ollama;
mod team;
mod wikipedia;

pub use discussion::FileDiscussionConfig;
pub use logging::FileLoggingConfig;
pub use ollama::FileOllamaConfig;
pub use team::{DEFAULT_TEAM_FILE, FileTeamConfig};
pub use wikipedia::FileWikipediaConfig;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use taskforce_application::DiscussionParams;
use taskforce_domain::Model;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Startup continues; the value is used as given.
    Warning,
    /// Startup aborts.
    Error,
}

/// One problem found by [`FileConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub message: String,
}

impl ConfigIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "warning: {}", self.message),
            Severity::Error => write!(f, "error: {}", self.message),
        }
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub ollama: FileOllamaConfig,
    pub wikipedia: FileWikipediaConfig,
    pub discussion: FileDiscussionConfig,
    pub team: FileTeamConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Check values that deserialize fine but cannot run.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.ollama.url.trim().is_empty() {
            issues.push(ConfigIssue::error("ollama.url cannot be empty"));
        }
        if self.ollama.default_model.trim().is_empty() {
            issues.push(ConfigIssue::error("ollama.default_model cannot be empty"));
        }
        if self.ollama.timeout_secs == 0 {
            issues.push(ConfigIssue::error("ollama.timeout_secs cannot be 0"));
        }

        let discussion = &self.discussion;
        if discussion.rounds == 0 {
            issues.push(ConfigIssue::error("discussion.rounds must be at least 1"));
        }
        if discussion.max_attempts == 0 {
            issues.push(ConfigIssue::error("discussion.max_attempts must be at least 1"));
        }
        if discussion.history_window == 0 {
            issues.push(ConfigIssue::warning(
                "discussion.history_window is 0; agents will not see the transcript",
            ));
        }
        if discussion.backoff_multiplier < 1.0 {
            issues.push(ConfigIssue::warning(format!(
                "discussion.backoff_multiplier {} is below 1.0; backoff will shrink",
                discussion.backoff_multiplier
            )));
        }
        if discussion.max_backoff_ms < discussion.initial_backoff_ms {
            issues.push(ConfigIssue::warning(
                "discussion.max_backoff_ms is below initial_backoff_ms; every wait is capped",
            ));
        }

        if self.wikipedia.enabled {
            if self.wikipedia.language.trim().is_empty() {
                issues.push(ConfigIssue::warning(
                    "wikipedia.language is empty; using 'en'",
                ));
            }
            if self.wikipedia.max_summary_chars == 0 {
                issues.push(ConfigIssue::warning(
                    "wikipedia.max_summary_chars is 0; summaries will be empty",
                ));
            }
        }

        if self.team.file.trim().is_empty() {
            issues.push(ConfigIssue::error("team.file cannot be empty"));
        }

        issues
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.ollama.timeout_secs)
    }

    pub fn default_model(&self) -> Model {
        Model::new(&self.ollama.default_model)
    }

    pub fn to_discussion_params(&self) -> DiscussionParams {
        self.discussion.to_discussion_params(self.request_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FileConfig::default();
        assert_eq!(config.ollama.url, "http://localhost:11434");
        assert_eq!(config.ollama.timeout_secs, 30);
        assert_eq!(config.default_model(), Model::new("llama3:latest"));
        assert!(config.wikipedia.enabled);
        assert_eq!(config.wikipedia.max_summary_chars, 750);
        assert_eq!(config.team.file, "data/taskforce.json");
        assert_eq!(config.logging, FileLoggingConfig::default());
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: FileConfig = toml::from_str(
            r#"
            [discussion]
            rounds = 5
            streaming = false

            [ollama]
            default_model = "mistral:7b"
            "#,
        )
        .unwrap();

        assert_eq!(config.discussion.rounds, 5);
        assert!(!config.discussion.streaming);
        assert_eq!(config.discussion.history_window, 5);
        assert_eq!(config.ollama.default_model, "mistral:7b");
        assert_eq!(config.ollama.url, "http://localhost:11434");
    }

    #[test]
    fn test_to_discussion_params() {
        let mut config = FileConfig::default();
        config.ollama.timeout_secs = 12;
        config.discussion.rounds = 4;
        config.discussion.max_attempts = 5;
        config.discussion.initial_backoff_ms = 100;
        config.discussion.isolate_rounds = true;

        let params = config.to_discussion_params();
        assert_eq!(params.rounds, 4);
        assert_eq!(params.request_timeout, Duration::from_secs(12));
        assert_eq!(params.retry.max_attempts, 5);
        assert_eq!(params.retry.initial_backoff, Duration::from_millis(100));
        assert!(params.isolate_rounds);
        assert!(params.final_response);
    }

    #[test]
    fn test_validate_reports_errors() {
        let mut config = FileConfig::default();
        config.discussion.rounds = 0;
        config.discussion.max_attempts = 0;
        config.ollama.default_model = " ".to_string();
        config.ollama.url = String::new();

        let issues = config.validate();
        let errors: Vec<_> = issues.iter().filter(|i| i.is_error()).collect();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|i| i.message.contains("discussion.rounds")));
        assert!(errors.iter().any(|i| i.message.contains("ollama.url")));
    }

    #[test]
    fn test_validate_warnings_do_not_block() {
        let mut config = FileConfig::default();
        config.discussion.history_window = 0;
        config.discussion.backoff_multiplier = 0.5;

        let issues = config.validate();
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
        assert!(issues[1].to_string().starts_with("warning: "));
    }
}
