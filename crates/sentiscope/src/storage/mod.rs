//! Storage layer for analysis history.
//!
//! Every analysed post is kept in `SQLite`, keyed by the platform's post id
//! and tagged with its author's screen name, so a user's sentiment can be
//! charted again later without refetching.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::dataset::{AnalyzedPost, Dataset};
use crate::error::{Error, Result};
use crate::sentiment::Sentiment;

const SELECT_COLUMNS: &str = "SELECT id, screen_name, created_at, cleaned, len, source, \
     likes, reposts, polarity, sentiment, analyzed_at FROM posts";

/// A stored analysis row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredPost {
    /// Author's screen name, or the requested name when the author was
    /// unknown.
    pub screen_name: String,
    /// The analysed post.
    #[serde(flatten)]
    pub post: AnalyzedPost,
    /// When the row was last written.
    pub analyzed_at: DateTime<Utc>,
}

/// Storage engine for analysed posts.
#[derive(Debug)]
pub struct Storage {
    path: PathBuf,
    conn: Connection,
}

fn to_db_time(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn from_db_time(idx: usize, value: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn limit_param(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// `SQLite` integers are signed; values above `i64::MAX` are rejected.
fn to_db_int<T>(value: T, column: &str) -> Result<i64>
where
    T: TryInto<i64> + Copy + std::fmt::Display,
{
    value
        .try_into()
        .map_err(|_| Error::internal(format!("{column} value {value} does not fit in SQLite")))
}

fn from_db_int<T: TryFrom<i64>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
where
    T::Error: std::error::Error + Send + Sync + 'static,
{
    let value: i64 = row.get(idx)?;
    T::try_from(value)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, Box::new(e)))
}

impl Storage {
    /// Open or create a history database at `path`.
    ///
    /// Creates missing parent directories and initializes the schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema
    /// initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or refresh one analysed post.
    ///
    /// The row is filed under `post.author`; `screen_name` is used only for
    /// posts without an author. Returns `true` if the post was not stored
    /// before.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn upsert(&self, screen_name: &str, post: &AnalyzedPost) -> Result<bool> {
        upsert_on(&self.conn, screen_name, post)
    }

    /// Upsert every row of `dataset` in one transaction.
    ///
    /// Returns the number of posts that were new.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; nothing is committed then.
    pub fn upsert_dataset(&self, screen_name: &str, dataset: &Dataset) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut inserted = 0;
        for row in dataset.rows() {
            if upsert_on(&tx, screen_name, row)? {
                inserted += 1;
            }
        }
        tx.commit()?;

        info!(
            screen_name,
            rows = dataset.len(),
            inserted,
            "Stored analysis"
        );
        Ok(inserted)
    }

    /// Get a stored post by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, id: u64) -> Result<Option<StoredPost>> {
        let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
        let post = self
            .conn
            .query_row(&sql, [to_db_int(id, "id")?], Self::row_to_post)
            .optional()?;
        Ok(post)
    }

    /// Most recent posts stored for `screen_name` (case-insensitive), newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn recent_for_user(&self, screen_name: &str, limit: usize) -> Result<Vec<StoredPost>> {
        let sql = format!(
            "{SELECT_COLUMNS} WHERE screen_name = ?1 COLLATE NOCASE \
             ORDER BY created_at DESC, id DESC LIMIT ?2"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let posts = stmt
            .query_map(params![screen_name, limit_param(limit)], Self::row_to_post)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    /// Count stored posts.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete posts published more than `max_age` ago.
    ///
    /// Returns the number of posts deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_older_than(&self, max_age: Duration) -> Result<usize> {
        let cutoff = to_db_time(Utc::now() - max_age);
        let affected = self
            .conn
            .execute("DELETE FROM posts WHERE created_at < ?1", [cutoff])?;

        if affected > 0 {
            info!("Pruned {} old posts", affected);
        }
        Ok(affected)
    }

    /// Keep only the `keep_count` most recently published posts.
    ///
    /// Returns the number of posts deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_keep_recent(&self, keep_count: usize) -> Result<usize> {
        let affected = self.conn.execute(
            r"
            DELETE FROM posts WHERE id NOT IN (
                SELECT id FROM posts ORDER BY created_at DESC, id DESC LIMIT ?1
            )
            ",
            [limit_param(keep_count)],
        )?;

        if affected > 0 {
            info!("Pruned {} posts to keep {} recent", affected, keep_count);
        }
        Ok(affected)
    }

    /// Database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let (total_posts, distinct_users, oldest, newest): (
            i64,
            i64,
            Option<String>,
            Option<String>,
        ) = self.conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT lower(screen_name)), MIN(created_at), MAX(created_at) \
             FROM posts",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;

        let oldest_post = oldest.as_deref().map(|s| from_db_time(2, s)).transpose()?;
        let newest_post = newest.as_deref().map(|s| from_db_time(3, s)).transpose()?;

        let mut stats = StorageStats {
            total_posts,
            distinct_users,
            oldest_post,
            newest_post,
            db_size_bytes: self.file_size(),
            positive: 0,
            neutral: 0,
            negative: 0,
        };

        let mut stmt = self
            .conn
            .prepare("SELECT sentiment, COUNT(*) FROM posts GROUP BY sentiment")?;
        let buckets = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for (value, count) in buckets {
            match Sentiment::from_value(value) {
                Some(Sentiment::Positive) => stats.positive = count,
                Some(Sentiment::Neutral) => stats.neutral = count,
                Some(Sentiment::Negative) => stats.negative = count,
                None => warn!(value, count, "Ignoring unknown sentiment value"),
            }
        }

        Ok(stats)
    }

    fn file_size(&self) -> u64 {
        if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        }
    }

    fn row_to_post(row: &rusqlite::Row) -> rusqlite::Result<StoredPost> {
        let created_at: String = row.get(2)?;
        let sentiment_value: i64 = row.get(9)?;
        let analyzed_at: String = row.get(10)?;
        let screen_name: String = row.get(1)?;

        let sentiment = Sentiment::from_value(sentiment_value).unwrap_or_else(|| {
            warn!(
                "Unknown sentiment value: {}, defaulting to neutral",
                sentiment_value
            );
            Sentiment::Neutral
        });

        Ok(StoredPost {
            screen_name: screen_name.clone(),
            post: AnalyzedPost {
                cleaned: row.get(3)?,
                id: from_db_int(row, 0)?,
                len: from_db_int(row, 4)?,
                date: from_db_time(2, &created_at)?,
                source: row.get(5)?,
                likes: from_db_int(row, 6)?,
                reposts: from_db_int(row, 7)?,
                polarity: row.get(8)?,
                sentiment,
                author: Some(screen_name),
            },
            analyzed_at: from_db_time(10, &analyzed_at)?,
        })
    }
}

fn upsert_on(conn: &Connection, screen_name: &str, post: &AnalyzedPost) -> Result<bool> {
    let id = to_db_int(post.id, "id")?;
    let owner = post.author.as_deref().unwrap_or(screen_name);
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?1)",
        [id],
        |row| row.get(0),
    )?;

    conn.execute(
        r"
        INSERT INTO posts (id, screen_name, created_at, cleaned, len, source,
                           likes, reposts, polarity, sentiment)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        ON CONFLICT(id) DO UPDATE SET
            screen_name = CASE WHEN ?11 THEN excluded.screen_name ELSE posts.screen_name END,
            cleaned = excluded.cleaned,
            len = excluded.len,
            source = excluded.source,
            likes = excluded.likes,
            reposts = excluded.reposts,
            polarity = excluded.polarity,
            sentiment = excluded.sentiment,
            analyzed_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
        ",
        params![
            id,
            owner,
            to_db_time(post.date),
            post.cleaned,
            to_db_int(post.len, "len")?,
            post.source,
            to_db_int(post.likes, "likes")?,
            to_db_int(post.reposts, "reposts")?,
            post.polarity,
            i64::from(post.sentiment.value()),
            post.author.is_some(),
        ],
    )?;

    debug!(id = post.id, new = !exists, "Upserted post");
    Ok(!exists)
}

/// Statistics about the history database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Total number of posts stored.
    pub total_posts: i64,
    /// Number of distinct screen names.
    pub distinct_users: i64,
    /// Publication date of the oldest stored post.
    pub oldest_post: Option<DateTime<Utc>>,
    /// Publication date of the newest stored post.
    pub newest_post: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
    /// Posts scored positive.
    pub positive: i64,
    /// Posts scored neutral.
    pub neutral: i64,
    /// Posts scored negative.
    pub negative: i64,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::post::fixtures::post;
    use crate::sentiment::SentimentAnalyzer;

    fn create_test_storage() -> Storage {
        Storage::open_in_memory().expect("failed to create test storage")
    }

    fn analyzed(id: u64, day: u32, text: &str) -> AnalyzedPost {
        AnalyzedPost::from_post(&post(id, day, text), &SentimentAnalyzer::new())
    }

    fn without_author(mut row: AnalyzedPost) -> AnalyzedPost {
        row.author = None;
        row
    }

    fn aged(id: u64, days_ago: i64) -> AnalyzedPost {
        let mut row = analyzed(id, 1, "fine");
        row.date = Utc::now() - Duration::days(days_ago);
        row
    }

    #[test]
    fn test_open_in_memory() {
        let storage = create_test_storage();
        assert_eq!(storage.path().to_string_lossy(), ":memory:");
        assert_eq!(storage.count().unwrap(), 0);
    }

    #[test]
    fn test_open_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/history.db");

        let storage = Storage::open(&path).unwrap();
        storage.upsert("alice", &analyzed(1, 1, "good")).unwrap();
        drop(storage);

        let reopened = Storage::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
        assert!(reopened.stats().unwrap().db_size_bytes > 0);
    }

    #[test]
    fn test_upsert_and_get() {
        let storage = create_test_storage();
        let row = analyzed(42, 5, "What a great day!");

        assert!(storage.upsert("alice", &row).unwrap());

        let stored = storage.get(42).unwrap().unwrap();
        assert_eq!(stored.screen_name, "alice");
        assert_eq!(stored.post, row);
    }

    #[test]
    fn test_upsert_existing_updates() {
        let storage = create_test_storage();
        let mut row = analyzed(7, 2, "good");
        assert!(storage.upsert("alice", &row).unwrap());

        row.likes = 99;
        row.sentiment = Sentiment::Negative;
        assert!(!storage.upsert("alice", &row).unwrap());

        let stored = storage.get(7).unwrap().unwrap();
        assert_eq!(stored.post.likes, 99);
        assert_eq!(stored.post.sentiment, Sentiment::Negative);
        assert_eq!(storage.count().unwrap(), 1);
    }

    #[test]
    fn test_upsert_files_under_author() {
        let storage = create_test_storage();
        let mut row = analyzed(5, 1, "good");
        row.author = Some("bob".to_string());

        storage.upsert("alice", &row).unwrap();
        assert_eq!(storage.get(5).unwrap().unwrap().screen_name, "bob");
        assert!(storage.recent_for_user("alice", 10).unwrap().is_empty());

        storage.upsert("carol", &without_author(row)).unwrap();
        let stored = storage.get(5).unwrap().unwrap();
        assert_eq!(stored.screen_name, "bob");
        assert_eq!(stored.post.author.as_deref(), Some("bob"));
    }

    #[test]
    fn test_upsert_without_author_uses_requested_name() {
        let storage = create_test_storage();
        storage
            .upsert("dave", &without_author(analyzed(6, 1, "fine")))
            .unwrap();

        let stored = storage.get(6).unwrap().unwrap();
        assert_eq!(stored.screen_name, "dave");
        assert_eq!(stored.post.author.as_deref(), Some("dave"));
    }

    #[test]
    fn test_get_nonexistent() {
        assert!(create_test_storage().get(99_999).unwrap().is_none());
    }

    #[test]
    fn test_upsert_dataset_counts_new() {
        let storage = create_test_storage();
        let posts = vec![post(1, 1, "good"), post(2, 2, "bad"), post(3, 3, "meh")];
        let dataset = Dataset::from_posts(&posts, &SentimentAnalyzer::new());

        assert_eq!(storage.upsert_dataset("alice", &dataset).unwrap(), 3);
        assert_eq!(storage.upsert_dataset("alice", &dataset).unwrap(), 0);
        assert_eq!(storage.count().unwrap(), 3);
    }

    #[test]
    fn test_recent_for_user() {
        let storage = create_test_storage();
        storage.upsert("alice", &analyzed(1, 1, "one")).unwrap();
        storage.upsert("alice", &analyzed(2, 3, "two")).unwrap();
        storage
            .upsert("Alice", &without_author(analyzed(3, 2, "three")))
            .unwrap();
        storage
            .upsert("bob", &without_author(analyzed(4, 4, "four")))
            .unwrap();

        let recent = storage.recent_for_user("ALICE", 10).unwrap();
        let ids: Vec<_> = recent.iter().map(|p| p.post.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        assert_eq!(storage.recent_for_user("alice", 1).unwrap().len(), 1);
        assert!(storage.recent_for_user("carol", 10).unwrap().is_empty());
    }

    #[test]
    fn test_prune_older_than() {
        let storage = create_test_storage();
        storage.upsert("alice", &aged(1, 400)).unwrap();
        storage.upsert("alice", &aged(2, 10)).unwrap();

        assert_eq!(storage.prune_older_than(Duration::days(365)).unwrap(), 1);
        assert!(storage.get(1).unwrap().is_none());
        assert!(storage.get(2).unwrap().is_some());
    }

    #[test]
    fn test_prune_keep_recent() {
        let storage = create_test_storage();
        for day in 1..=10 {
            storage
                .upsert("alice", &analyzed(u64::from(day), day, "post"))
                .unwrap();
        }

        assert_eq!(storage.prune_keep_recent(4).unwrap(), 6);
        let ids: Vec<_> = storage
            .recent_for_user("alice", 10)
            .unwrap()
            .iter()
            .map(|p| p.post.id)
            .collect();
        assert_eq!(ids, vec![10, 9, 8, 7]);
    }

    #[test]
    fn test_stats_empty() {
        let stats = create_test_storage().stats().unwrap();
        assert_eq!(stats.total_posts, 0);
        assert_eq!(stats.distinct_users, 0);
        assert!(stats.oldest_post.is_none());
        assert!(stats.newest_post.is_none());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_stats_with_data() {
        let storage = create_test_storage();
        storage.upsert("alice", &analyzed(1, 1, "great")).unwrap();
        storage
            .upsert("ALICE", &without_author(analyzed(2, 2, "terrible")))
            .unwrap();
        storage
            .upsert("bob", &without_author(analyzed(3, 3, "the store")))
            .unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_posts, 3);
        assert_eq!(stats.distinct_users, 2);
        assert_eq!((stats.positive, stats.neutral, stats.negative), (1, 1, 1));
        assert_eq!(
            stats.oldest_post,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(
            stats.newest_post,
            Some(Utc.with_ymd_and_hms(2024, 3, 3, 12, 0, 0).unwrap())
        );
    }
}
