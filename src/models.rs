use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A single story as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRecord {
    pub id: String,
    pub title: String,
    pub url: String,
    pub author: String,
    pub comment_count: u32,
    pub points: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl StoryRecord {
    /// Host part of the story link, empty for self posts.
    pub fn domain(&self) -> String {
        reqwest::Url::parse(&self.url)
            .ok()
            .and_then(|url| url.host_str().map(|host| host.trim_start_matches("www.").to_string()))
            .unwrap_or_default()
    }

    /// Relative age such as "3 hours ago", relative to `now`.
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        match self.created_at {
            Some(created) => format_age(now.signed_duration_since(created)),
            None => String::new(),
        }
    }
}

fn format_age(age: chrono::Duration) -> String {
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };

    if age.num_days() > 0 {
        plural(age.num_days(), "day")
    } else if age.num_hours() > 0 {
        plural(age.num_hours(), "hour")
    } else if age.num_minutes() > 0 {
        plural(age.num_minutes(), "minute")
    } else {
        "just now".to_string()
    }
}

/// Body of `GET /api/v1/search`. Only `hits` is required.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<Hit>,
}

/// One hit as the endpoint sends it. Comment hits carry nulls for most
/// story fields, so everything except the id is optional.
#[derive(Debug, Deserialize)]
pub struct Hit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub num_comments: Option<u32>,
    #[serde(default)]
    pub points: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Hit> for StoryRecord {
    fn from(hit: Hit) -> Self {
        let title = hit.title.unwrap_or_default();
        Self {
            id: hit.object_id,
            title: html_escape::decode_html_entities(&title).to_string(),
            url: hit.url.unwrap_or_default(),
            author: hit.author.unwrap_or_default(),
            comment_count: hit.num_comments.unwrap_or(0),
            points: hit.points.unwrap_or(0),
            created_at: hit.created_at,
        }
    }
}

/// The fetched collection together with its fetch lifecycle flags.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryCollectionState {
    pub items: Arc<[StoryRecord]>,
    pub is_loading: bool,
    pub is_error: bool,
}

impl Default for StoryCollectionState {
    fn default() -> Self {
        Self {
            items: Arc::from(Vec::new()),
            is_loading: false,
            is_error: false,
        }
    }
}
