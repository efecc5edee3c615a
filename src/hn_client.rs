use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::error::FetchError;
use crate::models::{SearchResponse, StoryRecord};

/// Anything that can turn a query URL into stories.
#[async_trait]
pub trait StorySource: Send + Sync {
    async fn fetch_stories(&self, query: &str) -> Result<Vec<StoryRecord>, FetchError>;
}

#[derive(Clone)]
pub struct HackerNewsClient {
    client: Client,
}

impl HackerNewsClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("hacker_news_search/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;

        Ok(Self { client })
    }

    /// Parses a search response body into stories, keeping server order.
    pub fn parse_stories(body: &str) -> Result<Vec<StoryRecord>, FetchError> {
        let response: SearchResponse = serde_json::from_str(body)?;
        Ok(response.hits.into_iter().map(StoryRecord::from).collect())
    }
}

#[async_trait]
impl StorySource for HackerNewsClient {
    async fn fetch_stories(&self, query: &str) -> Result<Vec<StoryRecord>, FetchError> {
        let response = self.client.get(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        let stories = Self::parse_stories(&body)?;
        tracing::debug!(query = %query, count = stories.len(), "fetched stories");
        Ok(stories)
    }
}

/// Offline source that answers every query with the same two stories
/// after a fixed delay.
pub struct FixtureSource {
    delay: Duration,
}

impl FixtureSource {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn stories() -> Vec<StoryRecord> {
        vec![
            StoryRecord {
                id: "0".to_string(),
                title: "React".to_string(),
                url: "https://reactjs.org/".to_string(),
                author: "Jordan Walke".to_string(),
                comment_count: 3,
                points: 4,
                created_at: None,
            },
            StoryRecord {
                id: "1".to_string(),
                title: "Redux".to_string(),
                url: "https://redux.js.org/".to_string(),
                author: "Dan Abramov, Andrew Clark".to_string(),
                comment_count: 2,
                points: 5,
                created_at: None,
            },
        ]
    }
}

impl Default for FixtureSource {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

#[async_trait]
impl StorySource for FixtureSource {
    async fn fetch_stories(&self, _query: &str) -> Result<Vec<StoryRecord>, FetchError> {
        tokio::time::sleep(self.delay).await;
        Ok(Self::stories())
    }
}
