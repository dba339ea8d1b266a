use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::PostSource;
use crate::models::Post;

// Twitter API v2
// Docs: https://developer.twitter.com/en/docs/twitter-api/tweets/timelines
pub const TWITTER_API_BASE: &str = "https://api.twitter.com";

// The timeline endpoint rejects max_results outside this range
const MIN_PAGE_SIZE: usize = 5;
const MAX_PAGE_SIZE: usize = 100;

/// Client for a user's tweet timeline (app-only bearer auth)
#[derive(Clone)]
pub struct TwitterClient {
    client: Client,
    base_url: String,
    bearer_token: String,
}

// ============== Response Types ==============

#[derive(Debug, Deserialize)]
struct UserResponse {
    data: UserData,
}

#[derive(Debug, Deserialize)]
struct UserData {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TimelineResponse {
    // Absent when the account has no tweets
    #[serde(default)]
    data: Vec<TweetData>,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
    text: String,
}

impl From<TweetData> for Post {
    fn from(raw: TweetData) -> Self {
        Post::new(raw.id, raw.text)
    }
}

// ============== Implementation ==============

impl TwitterClient {
    pub fn new(bearer_token: String) -> Self {
        Self::with_base_url(bearer_token, TWITTER_API_BASE)
    }

    pub fn with_base_url(bearer_token: String, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token,
        }
    }

    /// Resolve a screen name to its numeric user id
    /// Endpoint: GET /2/users/by/username/{handle}
    pub async fn lookup_user_id(&self, handle: &str) -> Result<String> {
        let url = format!("{}/2/users/by/username/{}", self.base_url, handle);
        let user: UserResponse = self.get_json(&url).await?;
        Ok(user.data.id)
    }

    /// Endpoint: GET /2/users/{id}/tweets?max_results={n}
    pub async fn get_user_timeline(&self, user_id: &str, limit: usize) -> Result<Vec<Post>> {
        let page_size = limit.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
        let url = format!(
            "{}/2/users/{}/tweets?max_results={}",
            self.base_url, user_id, page_size
        );

        let timeline: TimelineResponse = self.get_json(&url).await?;

        Ok(timeline
            .data
            .into_iter()
            .take(limit)
            .map(Post::from)
            .collect())
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.bearer_token)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Twitter API error ({}): {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse Twitter response")
    }
}

#[async_trait]
impl PostSource for TwitterClient {
    async fn fetch_recent_posts(&self, handle: &str, limit: usize) -> Result<Vec<Post>> {
        let user_id = self.lookup_user_id(handle).await?;
        let posts = self.get_user_timeline(&user_id, limit).await?;
        tracing::debug!(handle, count = posts.len(), "Fetched timeline");
        Ok(posts)
    }
}
