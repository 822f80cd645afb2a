//! Topic value object

use serde::{Deserialize, Serialize};

/// The subject of a discussion (Value Object)
///
/// Never empty or whitespace-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    content: String,
}

impl Topic {
    /// Try to create a new topic, returning None if blank
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self {
                content: content.trim().to_string(),
            })
        }
    }

    /// Get the topic text
    pub fn content(&self) -> &str {
        &self.content
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl std::str::FromStr for Topic {
    type Err = super::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Topic::try_new(s)
            .ok_or_else(|| super::error::DomainError::InvalidTopic("topic is empty".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_trims() {
        let topic = Topic::try_new("  Urban gardening  ").unwrap();
        assert_eq!(topic.content(), "Urban gardening");
        assert_eq!(topic.to_string(), "Urban gardening");
    }

    #[test]
    fn test_topic_rejects_blank() {
        assert!(Topic::try_new("").is_none());
        assert!(Topic::try_new(" \n\t").is_none());
        assert!("   ".parse::<Topic>().is_err());
    }
}
