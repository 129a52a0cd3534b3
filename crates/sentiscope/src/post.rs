//! Core post types for sentiscope.
//!
//! This module defines the fetched post record and the trait implemented by
//! everything that can produce posts (the REST client, archives on disk).

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single post as fetched from a source, before any analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Platform-assigned identifier.
    pub id: u64,

    /// Raw post text, exactly as the platform returned it.
    pub text: String,

    /// When the post was published.
    pub created_at: DateTime<Utc>,

    /// Name of the client the post was published from.
    pub source: String,

    /// Like (favorite) count at fetch time.
    pub likes: u64,

    /// Repost (retweet) count at fetch time.
    pub reposts: u64,

    /// Screen name of the author, when the source reports it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl Post {
    /// Length of the raw text in characters.
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the post was written by `screen_name` (case-insensitive).
    ///
    /// Posts without author information match any name.
    #[must_use]
    pub fn is_by(&self, screen_name: &str) -> bool {
        self.author
            .as_deref()
            .map_or(true, |author| author.eq_ignore_ascii_case(screen_name))
    }
}

/// Which timeline to read posts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Timeline {
    /// Posts written by a single account.
    #[default]
    User,
    /// The authenticated account's home feed.
    Home,
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Home => write!(f, "home"),
        }
    }
}

/// Parameters for a single fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Account whose posts are requested.
    pub screen_name: String,
    /// Maximum number of posts to return.
    pub count: u32,
    /// Which timeline to read.
    pub timeline: Timeline,
}

impl FetchRequest {
    /// Request the user timeline of `screen_name`.
    #[must_use]
    pub fn user(screen_name: impl Into<String>, count: u32) -> Self {
        Self {
            screen_name: screen_name.into(),
            count,
            timeline: Timeline::User,
        }
    }

    /// Request the home timeline.
    #[must_use]
    pub fn home(screen_name: impl Into<String>, count: u32) -> Self {
        Self {
            screen_name: screen_name.into(),
            count,
            timeline: Timeline::Home,
        }
    }
}

/// Anything that can produce posts for analysis.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// The name of this source (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Fetch up to `request.count` posts, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source cannot be read.
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Post>>;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::TimeZone;

    use super::*;

    /// Build a post at `2024-03-{day} 12:00 UTC`.
    pub fn post(id: u64, day: u32, text: &str) -> Post {
        Post {
            id,
            text: text.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            source: "Twitter Web App".to_string(),
            likes: id * 2,
            reposts: id,
            author: Some("alice".to_string()),
        }
    }
}
