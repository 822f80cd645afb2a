use serde::{Deserialize, Serialize};

pub const DEFAULT_TEAM_FILE: &str = "data/taskforce.json";

/// `[team]`: where the team definition is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileTeamConfig {
    pub file: String,
}

impl Default for FileTeamConfig {
    fn default() -> Self {
        Self {
            file: DEFAULT_TEAM_FILE.to_string(),
        }
    }
}
