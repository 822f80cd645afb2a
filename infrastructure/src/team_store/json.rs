use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use taskforce_application::{TeamRepository, TeamStoreError};
use taskforce_domain::AgentRecord;
use tracing::{debug, info};

/// Stores a team as a pretty-printed JSON array of agent records.
pub struct JsonTeamRepository {
    path: PathBuf,
}

impl JsonTeamRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn io_error(&self, source: std::io::Error) -> TeamStoreError {
        TeamStoreError::Io {
            path: self.location(),
            source,
        }
    }
}

impl TeamRepository for JsonTeamRepository {
    fn load(&self) -> Result<Vec<AgentRecord>, TeamStoreError> {
        let content = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TeamStoreError::NotFound(self.location()),
            _ => self.io_error(e),
        })?;

        let records: Vec<AgentRecord> =
            serde_json::from_str(&content).map_err(|e| TeamStoreError::Parse {
                path: self.location(),
                message: e.to_string(),
            })?;
        debug!("Loaded {} agent record(s) from {}", records.len(), self.location());
        Ok(records)
    }

    fn save(&self, records: &[AgentRecord]) -> Result<(), TeamStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let json = serde_json::to_string_pretty(records).map_err(|e| TeamStoreError::Parse {
            path: self.location(),
            message: e.to_string(),
        })?;
        fs::write(&self.path, json + "\n").map_err(|e| self.io_error(e))?;
        info!("Saved {} agent record(s) to {}", records.len(), self.location());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskforce_domain::{CoordinatorArchetype, Model, TaskForce};

    fn team() -> Vec<AgentRecord> {
        vec![
            AgentRecord::new("Ada", "Coordinator", "Keep us on track.")
                .as_coordinator(CoordinatorArchetype::Strategist),
            AgentRecord::new("Bo", "Gardener", "You grow vegetables.")
                .with_model(Model::new("mistral:7b")),
        ]
    }

    #[test]
    fn test_save_creates_directories_and_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonTeamRepository::new(dir.path().join("data").join("taskforce.json"));

        repo.save(&team()).unwrap();
        assert!(repo.exists());

        let loaded = repo.load().unwrap();
        assert_eq!(loaded, team());
        let task_force = TaskForce::from_records(loaded, &Model::default()).unwrap();
        assert_eq!(task_force.coordinator().map(|a| a.name()), Some("Ada"));
    }

    #[test]
    fn test_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonTeamRepository::new(dir.path().join("team.json"));
        repo.save(&team()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(repo.path()).unwrap()).unwrap();
        assert_eq!(raw[0]["is_coordinator"], true);
        assert_eq!(raw[0]["archetype"], "strategist");
        assert_eq!(raw[1]["model"], "mistral:7b");
        assert!(raw[1].get("archetype").is_none());
    }

    #[test]
    fn test_minimal_records_get_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team.json");
        fs::write(&path, r#"[{"name":"Cy","role":"Chef"}]"#).unwrap();

        let records = JsonTeamRepository::new(&path).load().unwrap();
        assert_eq!(records[0].prompt, "");
        assert!(!records[0].is_coordinator);
        assert_eq!(records[0].model, None);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonTeamRepository::new(dir.path().join("nope.json"));
        assert!(matches!(repo.load(), Err(TeamStoreError::NotFound(_))));
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("team.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonTeamRepository::new(&path).load(),
            Err(TeamStoreError::Parse { .. })
        ));
    }
}
