//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const PROJECT_FILES: [&str; 2] = ["taskforce.toml", ".taskforce.toml"];
const ENV_PREFIX: &str = "TASKFORCE_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("config file not found: {0}")]
    MissingFile(String),
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `TASKFORCE_*` environment variables (`__` separates sections)
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./taskforce.toml` or `./.taskforce.toml`
    /// 4. Global: `$XDG_CONFIG_HOME/taskforce/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, ConfigError> {
        if let Some(path) = config_path
            && !path.exists()
        {
            return Err(ConfigError::MissingFile(path.display().to_string()));
        }

        let mut files = Vec::new();
        if let Some(global) = Self::global_config_path().filter(|p| p.exists()) {
            files.push(global);
        }
        if let Some(project) = Self::project_config_path() {
            files.push(project);
        }
        if let Some(path) = config_path {
            files.push(path.to_path_buf());
        }

        Self::figment(&files)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| ConfigError::Load(Box::new(e)))
    }

    /// Defaults overlaid with `files`, later files winning.
    fn figment(files: &[PathBuf]) -> Figment {
        files.iter().fold(
            Figment::new().merge(Serialized::defaults(FileConfig::default())),
            |figment, path| {
                debug!("Merging config file {}", path.display());
                figment.merge(Toml::file(path))
            },
        )
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("taskforce").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_global_config_path() {
        let path = ConfigLoader::global_config_path().unwrap();
        assert!(path.ends_with("taskforce/config.toml"));
    }

    #[test]
    fn test_later_files_win() {
        let dir = tempfile::tempdir().unwrap();
        let global = write(
            &dir,
            "global.toml",
            "[discussion]\nrounds = 7\nhistory_window = 2\n",
        );
        let explicit = write(&dir, "explicit.toml", "[discussion]\nrounds = 4\n");

        let config: FileConfig = ConfigLoader::figment(&[global, explicit])
            .extract()
            .unwrap();
        assert_eq!(config.discussion.rounds, 4);
        assert_eq!(config.discussion.history_window, 2);
        assert_eq!(config.discussion.max_attempts, 3);
    }

    #[test]
    fn test_type_error_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write(&dir, "bad.toml", "[discussion]\nrounds = \"many\"\n");

        let result: Result<FileConfig, _> = ConfigLoader::figment(&[bad]).extract();
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = ConfigLoader::load(Some(Path::new("/nonexistent/taskforce.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }
}
