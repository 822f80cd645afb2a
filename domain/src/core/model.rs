//! Model value object representing an inference model identifier

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The model used when neither the agent record nor the configuration names one.
pub const DEFAULT_MODEL: &str = "llama3:latest";

/// Identifier of a locally served model (Value Object)
///
/// Model names are opaque to the domain; the inference adapter decides
/// whether a name is installed. Surrounding whitespace is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Model(String);

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Model name without the `:tag` suffix (`llama3:latest` -> `llama3`).
    pub fn family(&self) -> &str {
        self.0.split(':').next().unwrap_or(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the default set of models offered when listing fails
    pub fn default_models() -> Vec<Model> {
        vec![Model::default()]
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::new(DEFAULT_MODEL)
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let model = Model::new(s);
        if model.is_empty() {
            Err("model name must not be empty".to_string())
        } else {
            Ok(model)
        }
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Model::new(s)
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Model::new(s))
    }
}
