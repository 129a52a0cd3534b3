//! JSON-lines archive of raw status objects.
//!
//! `fetch --save` appends one status per line; `analyze --input` reads the
//! file back as a [`PostSource`], so an analysis can be re-run without
//! touching the network.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::parse_status;
use crate::error::{Error, Result};
use crate::post::{FetchRequest, Post, PostSource, Timeline};

/// A JSON-lines file of raw status objects.
#[derive(Debug, Clone)]
pub struct Archive {
    path: PathBuf,
}

impl Archive {
    /// Archive backed by the file at `path` (which need not exist yet).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append raw statuses, one JSON object per line.
    ///
    /// Returns the number of lines written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be
    /// created or written.
    pub fn append(&self, statuses: &[Value]) -> Result<usize> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);

        for status in statuses {
            serde_json::to_writer(&mut writer, status)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;

        info!(path = %self.path.display(), count = statuses.len(), "Appended to archive");
        Ok(statuses.len())
    }

    /// Read every post in the archive, in file order.
    ///
    /// Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is not a
    /// well-formed status; the error names the offending line.
    pub fn read_all(&self) -> Result<Vec<Post>> {
        let reader = BufReader::new(File::open(&self.path)?);
        let mut posts = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let record_err = |message: String| Error::ArchiveRecord {
                path: self.path.clone(),
                line: index + 1,
                message,
            };

            let value: Value =
                serde_json::from_str(&line).map_err(|e| record_err(e.to_string()))?;
            let post = parse_status(value).map_err(|e| record_err(e.to_string()))?;
            posts.push(post);
        }

        debug!(path = %self.path.display(), count = posts.len(), "Read archive");
        Ok(posts)
    }
}

#[async_trait]
impl PostSource for Archive {
    fn name(&self) -> &'static str {
        "archive"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Post>> {
        let filter_author =
            request.timeline == Timeline::User && !request.screen_name.trim().is_empty();

        let posts = self
            .read_all()?
            .into_iter()
            .filter(|post| !filter_author || post.is_by(&request.screen_name))
            .take(request.count as usize)
            .collect();
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn status(id: u64, author: &str, text: &str) -> Value {
        json!({
            "id": id,
            "created_at": "Mon Mar 04 12:00:00 +0000 2024",
            "text": text,
            "source": "web",
            "favorite_count": 1,
            "retweet_count": 0,
            "user": { "screen_name": author }
        })
    }

    #[test]
    fn test_append_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path().join("nested/posts.jsonl"));

        let written = archive
            .append(&[status(2, "alice", "great"), status(1, "alice", "bad")])
            .unwrap();
        assert_eq!(written, 2);
        archive.append(&[status(3, "bob", "meh")]).unwrap();

        let posts = archive.read_all().unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_read_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.jsonl");
        let line = serde_json::to_string(&status(1, "alice", "hi")).unwrap();
        std::fs::write(&path, format!("\n{line}\n   \n")).unwrap();

        let posts = Archive::new(&path).read_all().unwrap();
        assert_eq!(posts.len(), 1);
    }

    #[test]
    fn test_read_reports_bad_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("posts.jsonl");
        let line = serde_json::to_string(&status(1, "alice", "hi")).unwrap();
        std::fs::write(&path, format!("{line}\nnot json\n")).unwrap();

        let err = Archive::new(&path).read_all().unwrap_err();
        match err {
            Error::ArchiveRecord { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_missing_file() {
        let err = Archive::new("/nonexistent/posts.jsonl").read_all().unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[tokio::test]
    async fn test_fetch_filters_author_and_count() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path().join("posts.jsonl"));
        archive
            .append(&[
                status(5, "alice", "one"),
                status(4, "bob", "two"),
                status(3, "Alice", "three"),
                status(2, "alice", "four"),
            ])
            .unwrap();

        let posts = archive.fetch(&FetchRequest::user("alice", 2)).await.unwrap();
        let ids: Vec<_> = posts.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![5, 3]);
    }

    #[tokio::test]
    async fn test_fetch_home_does_not_filter() {
        let dir = tempfile::tempdir().unwrap();
        let archive = Archive::new(dir.path().join("posts.jsonl"));
        archive
            .append(&[status(2, "alice", "one"), status(1, "bob", "two")])
            .unwrap();

        let posts = archive.fetch(&FetchRequest::home("alice", 10)).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(archive.name(), "archive");
    }
}
