//! Configuration file loading for taskforce
//!
//! Built-in defaults are overlaid by the global config file, a project file,
//! an explicit `--config` file and finally `TASKFORCE_*` environment
//! variables. See [`ConfigLoader::load`].

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, DEFAULT_TEAM_FILE, FileConfig, FileDiscussionConfig, FileLoggingConfig,
    FileOllamaConfig, FileTeamConfig, FileWikipediaConfig, Severity,
};
pub use loader::{ConfigError, ConfigLoader};
