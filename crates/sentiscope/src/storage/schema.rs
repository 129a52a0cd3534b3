//! `SQLite` schema definitions for the analysis history.

/// SQL statement to create the posts table.
///
/// `id` is the platform's post id, so re-analysing a post updates its row.
pub const CREATE_POSTS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS posts (
    id INTEGER PRIMARY KEY,
    screen_name TEXT NOT NULL,
    created_at TEXT NOT NULL,
    cleaned TEXT NOT NULL,
    len INTEGER NOT NULL,
    source TEXT NOT NULL,
    likes INTEGER NOT NULL,
    reposts INTEGER NOT NULL,
    polarity REAL NOT NULL,
    sentiment INTEGER NOT NULL,
    analyzed_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
)
";

/// Index for per-user history ordered by post date.
pub const CREATE_USER_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_posts_user_date ON posts(screen_name, created_at DESC)
";

/// Index for age-based pruning.
pub const CREATE_DATE_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_posts_date ON posts(created_at DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_POSTS_TABLE,
    CREATE_USER_DATE_INDEX,
    CREATE_DATE_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.trim().is_empty());
        }
    }

    #[test]
    fn test_posts_table_columns() {
        for column in [
            "id INTEGER PRIMARY KEY",
            "screen_name TEXT NOT NULL",
            "created_at TEXT NOT NULL",
            "polarity REAL NOT NULL",
            "sentiment INTEGER NOT NULL",
        ] {
            assert!(CREATE_POSTS_TABLE.contains(column), "missing {column}");
        }
    }
}
