use super::response::{first_search_title, page_extract};
use async_trait::async_trait;
use std::time::Duration;
use taskforce_application::KnowledgeLookup;
use taskforce_domain::util::truncate_with_ellipsis;
use tracing::{debug, warn};

pub const DEFAULT_USER_AGENT: &str = "MultiAgentDiscussionSystem/0.1";

/// Looks terms up through the MediaWiki action API.
///
/// Network and decoding failures are logged and reported as "no result".
pub struct WikipediaLookup {
    client: reqwest::Client,
    endpoint: String,
    user_agent: String,
    timeout: Duration,
    max_summary_chars: usize,
}

impl WikipediaLookup {
    pub fn new(language: &str) -> Self {
        let language = match language.trim() {
            "" => "en",
            lang => lang,
        };
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("https://{language}.wikipedia.org/w/api.php"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(15),
            max_summary_chars: 750,
        }
    }

    /// Point at another MediaWiki installation.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_summary_chars(mut self, max: usize) -> Self {
        self.max_summary_chars = max;
        self
    }

    async fn query(&self, params: &[(&str, &str)]) -> Option<String> {
        let response = match self
            .client
            .get(&self.endpoint)
            .header("User-Agent", &self.user_agent)
            .query(&[("action", "query"), ("format", "json")])
            .query(params)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                warn!("Wikipedia request failed: {}", e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Wikipedia returned HTTP {}", status.as_u16());
            return None;
        }
        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                warn!("Failed to read Wikipedia response: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl KnowledgeLookup for WikipediaLookup {
    async fn search(&self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        let body = self
            .query(&[("list", "search"), ("srsearch", query), ("srlimit", "1")])
            .await?;
        let title = first_search_title(&body);
        debug!("Wikipedia search '{}' -> {:?}", query, title);
        title
    }

    async fn summary(&self, title: &str) -> Option<String> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let body = self
            .query(&[
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
                ("titles", title),
            ])
            .await?;
        let extract = page_extract(&body)?;
        debug!("Wikipedia summary for '{}': {} chars", title, extract.chars().count());
        Some(truncate_with_ellipsis(&extract, self.max_summary_chars))
    }
}
