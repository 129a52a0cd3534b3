//! Wire types for the v1.1 REST JSON format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::post::Post;

/// Layout of `created_at`, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const CREATED_AT_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// A status object, reduced to the fields we read.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiStatus {
    id: u64,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    full_text: Option<String>,
    created_at: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    favorite_count: Option<u64>,
    #[serde(default)]
    retweet_count: Option<u64>,
    #[serde(default)]
    user: Option<ApiUser>,
}

/// A user object, reduced to the fields we read.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiUser {
    #[serde(default)]
    id: u64,
    screen_name: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    followers_count: u64,
    #[serde(default)]
    description: Option<String>,
}

/// One page of `friends/list`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FriendsPage {
    #[serde(default)]
    pub users: Vec<ApiUser>,
    #[serde(default)]
    pub next_cursor: i64,
}

/// An account followed by the requested user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    /// Platform-assigned identifier.
    pub id: u64,
    /// Handle, without the leading `@`.
    pub screen_name: String,
    /// Display name.
    pub name: String,
    /// Follower count.
    pub followers: u64,
    /// Profile description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<ApiUser> for Friend {
    fn from(user: ApiUser) -> Self {
        Self {
            id: user.id,
            screen_name: user.screen_name,
            name: user.name,
            followers: user.followers_count,
            description: user.description.filter(|d| !d.is_empty()),
        }
    }
}

impl ApiStatus {
    /// Convert into a [`Post`].
    ///
    /// # Errors
    ///
    /// Returns an error if `created_at` is not in the expected layout or the
    /// status has no text at all.
    pub(crate) fn into_post(self) -> Result<Post> {
        let created_at = parse_created_at(&self.created_at)?;
        let text = self
            .full_text
            .or(self.text)
            .ok_or_else(|| Error::api_parse(format!("status {} has no text", self.id)))?;

        Ok(Post {
            id: self.id,
            text,
            created_at,
            source: self.source.as_deref().map(source_name).unwrap_or_default(),
            likes: self.favorite_count.unwrap_or(0),
            reposts: self.retweet_count.unwrap_or(0),
            author: self.user.map(|u| u.screen_name),
        })
    }
}

/// Decode a raw status JSON value into a [`Post`].
///
/// # Errors
///
/// Returns an error if the value is not a well-formed status.
pub fn parse_status(value: Value) -> Result<Post> {
    let status: ApiStatus =
        serde_json::from_value(value).map_err(|e| Error::api_parse(e.to_string()))?;
    status.into_post()
}

/// Parse a `created_at` timestamp.
///
/// # Errors
///
/// Returns an error if the string does not match [`CREATED_AT_FORMAT`].
pub fn parse_created_at(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_str(raw, CREATED_AT_FORMAT)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::api_parse(format!("bad created_at '{raw}': {e}")))
}

/// Extract the client name from a `source` field.
///
/// The API sends an HTML anchor (`<a href="...">Twitter for iPhone</a>`);
/// anything else is returned trimmed.
#[must_use]
pub fn source_name(raw: &str) -> String {
    let raw = raw.trim();
    if raw.starts_with("<a") {
        if let (Some(open_end), Some(close)) = (raw.find('>'), raw.rfind("</a>")) {
            if open_end < close {
                return raw[open_end + 1..close].trim().to_string();
            }
        }
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    fn status_json() -> Value {
        json!({
            "id": 1_050_118_621_198_921_728_u64,
            "created_at": "Wed Oct 10 20:19:24 +0000 2018",
            "full_text": "To make room for more expression, we will now count all emojis as equal",
            "text": "To make room for more expression…",
            "source": "<a href=\"https://mobile.twitter.com\" rel=\"nofollow\">Twitter Web App</a>",
            "favorite_count": 42,
            "retweet_count": 7,
            "user": { "id": 6253282, "screen_name": "TwitterAPI", "name": "Twitter API" }
        })
    }

    #[test]
    fn test_parse_status() {
        let post = parse_status(status_json()).unwrap();

        assert_eq!(post.id, 1_050_118_621_198_921_728);
        assert!(post.text.starts_with("To make room for more expression, we"));
        assert_eq!(
            post.created_at,
            Utc.with_ymd_and_hms(2018, 10, 10, 20, 19, 24).unwrap()
        );
        assert_eq!(post.source, "Twitter Web App");
        assert_eq!(post.likes, 42);
        assert_eq!(post.reposts, 7);
        assert_eq!(post.author.as_deref(), Some("TwitterAPI"));
    }

    #[test]
    fn test_parse_status_falls_back_to_text() {
        let mut value = status_json();
        value.as_object_mut().unwrap().remove("full_text");

        let post = parse_status(value).unwrap();
        assert_eq!(post.text, "To make room for more expression…");
    }

    #[test]
    fn test_parse_status_without_text_fails() {
        let mut value = status_json();
        let obj = value.as_object_mut().unwrap();
        obj.remove("full_text");
        obj.remove("text");

        assert!(parse_status(value).is_err());
    }

    #[test]
    fn test_parse_status_null_counts() {
        let mut value = status_json();
        value["favorite_count"] = Value::Null;

        let post = parse_status(value).unwrap();
        assert_eq!(post.likes, 0);
    }

    #[test]
    fn test_parse_status_missing_id_fails() {
        let mut value = status_json();
        value.as_object_mut().unwrap().remove("id");

        let err = parse_status(value).unwrap_err();
        assert!(matches!(err, Error::ApiParse { .. }));
    }

    #[test]
    fn test_parse_created_at_offset() {
        let dt = parse_created_at("Mon Jan 01 10:00:00 +0200 2024").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_created_at_rejects_rfc3339() {
        assert!(parse_created_at("2024-01-01T10:00:00Z").is_err());
    }

    #[test]
    fn test_source_name() {
        assert_eq!(
            source_name(r#"<a href="http://twitter.com/download/iphone" rel="nofollow">Twitter for iPhone</a>"#),
            "Twitter for iPhone"
        );
        assert_eq!(source_name("web"), "web");
        assert_eq!(source_name("  <a broken"), "<a broken");
    }

    #[test]
    fn test_friend_from_user() {
        let user: ApiUser = serde_json::from_value(json!({
            "id": 12,
            "screen_name": "jack",
            "name": "jack",
            "followers_count": 100,
            "description": ""
        }))
        .unwrap();

        let friend = Friend::from(user);
        assert_eq!(friend.screen_name, "jack");
        assert_eq!(friend.followers, 100);
        assert!(friend.description.is_none());
    }
}
