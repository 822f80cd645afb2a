//! Knowledge lookup port and its session-scoped cache.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use taskforce_domain::KnowledgeNote;
use tracing::debug;

/// External encyclopedia-style lookup.
///
/// Absence of a result is not an error; adapters log their own failures and
/// return `None`.
#[async_trait]
pub trait KnowledgeLookup: Send + Sync {
    /// Title of the best match for `query`.
    async fn search(&self, query: &str) -> Option<String>;

    /// Short summary of the article named `title`.
    async fn summary(&self, title: &str) -> Option<String>;
}

/// Lookup that never finds anything.
pub struct NoKnowledge;

#[async_trait]
impl KnowledgeLookup for NoKnowledge {
    async fn search(&self, _query: &str) -> Option<String> {
        None
    }

    async fn summary(&self, _title: &str) -> Option<String> {
        None
    }
}

/// Memoises lookups for the lifetime of one discussion session.
///
/// Misses are cached too, so a term is fetched at most once per session.
pub struct KnowledgeCache {
    source: Arc<dyn KnowledgeLookup>,
    entries: HashMap<String, Option<KnowledgeNote>>,
}

impl KnowledgeCache {
    pub fn new(source: Arc<dyn KnowledgeLookup>) -> Self {
        Self {
            source,
            entries: HashMap::new(),
        }
    }

    /// Summary for `term`: direct title first, then the best search hit.
    pub async fn lookup(&mut self, term: &str) -> Option<KnowledgeNote> {
        let key = term.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        if let Some(cached) = self.entries.get(&key) {
            debug!("Knowledge cache hit for '{}'", term);
            return cached.clone();
        }

        let note = match self.source.summary(term).await {
            Some(summary) => Some(KnowledgeNote {
                term: term.to_string(),
                summary,
            }),
            None => match self.source.search(term).await {
                Some(title) => self
                    .source
                    .summary(&title)
                    .await
                    .map(|summary| KnowledgeNote { term: title, summary }),
                None => None,
            },
        };

        self.entries.insert(key, note.clone());
        note
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
