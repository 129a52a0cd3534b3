//! Error types for sentiscope.
//!
//! This module defines all error types used throughout the sentiscope crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for sentiscope operations.
#[derive(Error, Debug)]
pub enum Error {
    // === API Errors ===
    /// The HTTP request could not be sent or the connection failed.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API rejected our credentials.
    #[error("API rejected credentials (HTTP {status})")]
    Unauthorized {
        /// HTTP status code returned.
        status: u16,
    },

    /// The requested account does not exist.
    #[error("user not found: {screen_name}")]
    UserNotFound {
        /// Screen name that was looked up.
        screen_name: String,
    },

    /// The API reported that the rate limit was exceeded.
    #[error("API rate limit exceeded")]
    RateLimited,

    /// The API returned an unexpected status.
    #[error("API returned HTTP {status}: {body}")]
    ApiStatus {
        /// HTTP status code returned.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The API response could not be decoded.
    #[error("failed to parse API response: {message}")]
    ApiParse {
        /// Description of what went wrong.
        message: String,
    },

    // === Archive Errors ===
    /// A line in a post archive could not be parsed.
    #[error("invalid archive record at {path}:{line}: {message}")]
    ArchiveRecord {
        /// Path to the archive file.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// Description of what went wrong.
        message: String,
    },

    // === Analysis Errors ===
    /// There were no posts to chart or export.
    #[error("no posts to analyze")]
    EmptyDataset,

    /// Failed to render the sentiment chart.
    #[error("failed to render chart to {path}: {message}")]
    Chart {
        /// Output path of the chart.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// Failed to load a sentiment lexicon file.
    #[error("failed to load lexicon from {path}: {message}")]
    LexiconLoad {
        /// Path to the lexicon file.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// No API bearer token was configured.
    #[error(
        "no API bearer token configured; set api.bearer_token or SENTISCOPE_API__BEARER_TOKEN"
    )]
    MissingCredentials,

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for sentiscope operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Create an API parse error.
    #[must_use]
    pub fn api_parse(message: impl Into<String>) -> Self {
        Self::ApiParse {
            message: message.into(),
        }
    }

    /// Create a chart rendering error.
    #[must_use]
    pub fn chart(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Chart {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error indicates the API rate limit was hit.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// Check if this error indicates the requested user does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(Error::RateLimited.to_string(), "API rate limit exceeded");
        assert_eq!(Error::EmptyDataset.to_string(), "no posts to analyze");
    }

    #[test]
    fn test_error_is_rate_limited() {
        assert!(Error::RateLimited.is_rate_limited());
        assert!(!Error::EmptyDataset.is_rate_limited());
    }

    #[test]
    fn test_error_is_not_found() {
        let err = Error::UserNotFound {
            screen_name: "nobody".to_string(),
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("nobody"));
        assert!(!Error::RateLimited.is_not_found());
    }

    #[test]
    fn test_api_status_display() {
        let err = Error::ApiStatus {
            status: 500,
            body: "upstream exploded".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("upstream exploded"));
    }

    #[test]
    fn test_unauthorized_display() {
        let err = Error::Unauthorized { status: 401 };
        assert!(err.to_string().contains("401"));
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
    }

    #[test]
    fn test_api_parse_error() {
        let err = Error::api_parse("missing field `id`");
        assert!(err.to_string().contains("missing field `id`"));
    }

    #[test]
    fn test_chart_error_display() {
        let err = Error::chart("/tmp/out.svg", "backend failure");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/out.svg"));
        assert!(msg.contains("backend failure"));
    }

    #[test]
    fn test_archive_record_display() {
        let err = Error::ArchiveRecord {
            path: PathBuf::from("posts.jsonl"),
            line: 7,
            message: "expected value".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid archive record at posts.jsonl:7: expected value"
        );
    }

    #[test]
    fn test_missing_credentials_mentions_env_var() {
        let msg = Error::MissingCredentials.to_string();
        assert!(msg.contains("SENTISCOPE_API__BEARER_TOKEN"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::config_validation("timeout_secs must be greater than 0");
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
