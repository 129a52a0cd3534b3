//! REST client for the posts API.
//!
//! Talks the v1.1 JSON format: user and home timelines (paged with
//! `max_id`) and the friends list (paged with cursors). Authentication is a
//! pre-issued bearer token; obtaining one is out of scope.

mod wire;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{ApiConfig, MAX_PAGE_SIZE};
use crate::error::{Error, Result};
use crate::post::{FetchRequest, Post, PostSource, Timeline};

pub use wire::{parse_created_at, parse_status, source_name, Friend, CREATED_AT_FORMAT};

use wire::FriendsPage;

const USER_TIMELINE_PATH: &str = "/1.1/statuses/user_timeline.json";
const HOME_TIMELINE_PATH: &str = "/1.1/statuses/home_timeline.json";
const FRIENDS_PATH: &str = "/1.1/friends/list.json";

/// HTTP client for the posts API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    bearer_token: String,
}

impl ApiClient {
    /// Create a client for `base_url` authenticating with `bearer_token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        bearer_token: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer_token: bearer_token.into(),
        })
    }

    /// Create a client from the `api` config section.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingCredentials`] when no bearer token is set, or
    /// an error if the HTTP client cannot be built.
    pub fn from_config(config: &ApiConfig) -> Result<Self> {
        let token = config
            .bearer_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(Error::MissingCredentials)?;

        Self::new(
            &config.base_url,
            token,
            config.timeout(),
            &config.user_agent,
        )
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch up to `request.count` raw status objects, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// malformed page.
    pub async fn timeline_raw(&self, request: &FetchRequest) -> Result<Vec<Value>> {
        let wanted = request.count as usize;
        let path = match request.timeline {
            Timeline::User => USER_TIMELINE_PATH,
            Timeline::Home => HOME_TIMELINE_PATH,
        };

        let mut collected: Vec<Value> = Vec::with_capacity(wanted);
        let mut max_id: Option<u64> = None;

        while collected.len() < wanted {
            let remaining = wanted - collected.len();
            let page_size = remaining.min(MAX_PAGE_SIZE as usize);

            let mut query = vec![
                ("count", page_size.to_string()),
                ("tweet_mode", "extended".to_string()),
                ("include_rts", "true".to_string()),
            ];
            if request.timeline == Timeline::User {
                query.push(("screen_name", request.screen_name.clone()));
            }
            if let Some(id) = max_id {
                query.push(("max_id", id.to_string()));
            }

            let page: Vec<Value> = self
                .get_json(path, &query, &request.screen_name)
                .await?;
            if page.is_empty() {
                break;
            }

            let last_id = page
                .last()
                .and_then(|status| status.get("id"))
                .and_then(Value::as_u64)
                .ok_or_else(|| Error::api_parse("status without a numeric id"))?;

            debug!(
                screen_name = %request.screen_name,
                page_len = page.len(),
                last_id,
                "Fetched timeline page"
            );
            collected.extend(page.into_iter().take(remaining));

            // Stop if the server ignored max_id or we reached the oldest post
            if max_id.is_some_and(|bound| last_id > bound) || last_id == 0 {
                break;
            }
            max_id = Some(last_id - 1);
        }

        info!(
            screen_name = %request.screen_name,
            timeline = %request.timeline,
            count = collected.len(),
            "Fetched posts"
        );
        Ok(collected)
    }

    /// Fetch up to `count` posts from `screen_name`'s own timeline.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::timeline_raw`].
    pub async fn user_timeline(&self, screen_name: &str, count: u32) -> Result<Vec<Post>> {
        self.fetch(&FetchRequest::user(screen_name, count)).await
    }

    /// Fetch up to `count` posts from the authenticated account's home feed.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::timeline_raw`].
    pub async fn home_timeline(&self, count: u32) -> Result<Vec<Post>> {
        self.fetch(&FetchRequest::home(String::new(), count)).await
    }

    /// List up to `count` accounts that `screen_name` follows.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-success status, or a
    /// malformed page.
    pub async fn friends(&self, screen_name: &str, count: u32) -> Result<Vec<Friend>> {
        let wanted = count as usize;
        let mut friends = Vec::with_capacity(wanted);
        let mut cursor: i64 = -1;

        while friends.len() < wanted {
            let remaining = wanted - friends.len();
            let query = vec![
                ("screen_name", screen_name.to_string()),
                ("count", remaining.min(MAX_PAGE_SIZE as usize).to_string()),
                ("cursor", cursor.to_string()),
                ("skip_status", "true".to_string()),
                ("include_user_entities", "false".to_string()),
            ];

            let page: FriendsPage = self.get_json(FRIENDS_PATH, &query, screen_name).await?;
            let done = page.users.is_empty() || page.next_cursor == 0;

            friends.extend(page.users.into_iter().take(remaining).map(Friend::from));
            if done {
                break;
            }
            cursor = page.next_cursor;
        }

        debug!(screen_name, count = friends.len(), "Fetched friends");
        Ok(friends)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        screen_name: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(Error::Unauthorized {
                    status: status.as_u16(),
                });
            }
            StatusCode::NOT_FOUND => {
                return Err(Error::UserNotFound {
                    screen_name: screen_name.to_string(),
                });
            }
            StatusCode::TOO_MANY_REQUESTS => return Err(Error::RateLimited),
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(Error::ApiStatus {
                    status: s.as_u16(),
                    body,
                });
            }
            _ => {}
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::api_parse(e.to_string()))
    }
}

#[async_trait]
impl PostSource for ApiClient {
    fn name(&self) -> &'static str {
        "api"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Post>> {
        self.timeline_raw(request)
            .await?
            .into_iter()
            .map(parse_status)
            .collect()
    }
}
