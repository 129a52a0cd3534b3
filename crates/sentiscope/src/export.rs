//! Flat spreadsheet export of a [`Dataset`].

use std::path::Path;

use chrono::SecondsFormat;
use serde::Serialize;
use tracing::info;

use crate::dataset::{AnalyzedPost, Dataset};
use crate::error::{Error, Result};

/// Column headers, in file order.
pub const COLUMNS: [&str; 9] = [
    "index", "tweets", "id", "len", "date", "source", "likes", "retweets", "sentiment",
];

#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    index: usize,
    tweets: &'a str,
    id: u64,
    len: usize,
    date: String,
    source: &'a str,
    likes: u64,
    retweets: u64,
    sentiment: i8,
}

impl<'a> ExportRow<'a> {
    fn new(index: usize, row: &'a AnalyzedPost) -> Self {
        Self {
            index,
            tweets: &row.cleaned,
            id: row.id,
            len: row.len,
            date: row.date.to_rfc3339_opts(SecondsFormat::Secs, true),
            source: &row.source,
            likes: row.likes,
            retweets: row.reposts,
            sentiment: row.sentiment.value(),
        }
    }
}

/// Write `dataset` as CSV to `path`, replacing any existing file.
///
/// Missing parent directories are created. Returns the number of data rows
/// written.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be created or written.
pub fn write_csv(dataset: &Dataset, path: impl AsRef<Path>) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    if dataset.is_empty() {
        // serialize() only emits headers alongside the first record
        writer.write_record(COLUMNS)?;
    }
    for (index, row) in dataset.rows().iter().enumerate() {
        writer.serialize(ExportRow::new(index, row))?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = dataset.len(), "Exported dataset");
    Ok(dataset.len())
}

/// The same rows as [`write_csv`] produces, as a JSON array of objects.
///
/// # Errors
///
/// Returns an error if a row cannot be serialized.
pub fn to_json(dataset: &Dataset) -> Result<serde_json::Value> {
    let rows: Vec<ExportRow<'_>> = dataset
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| ExportRow::new(index, row))
        .collect();
    Ok(serde_json::to_value(rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::fixtures::post;
    use crate::sentiment::SentimentAnalyzer;

    fn dataset() -> Dataset {
        let mut quoted = post(1, 2, "Nice, \"quoted\" stuff");
        quoted.source = "Client, Inc.".to_string();
        let posts = vec![post(2, 3, "I love it! @x"), quoted];
        Dataset::from_posts(&posts, &SentimentAnalyzer::new())
    }

    #[test]
    fn test_write_csv_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/output.csv");

        let rows = write_csv(&dataset(), &path).unwrap();
        assert_eq!(rows, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "index,tweets,id,len,date,source,likes,retweets,sentiment"
        );
        assert_eq!(
            lines.next().unwrap(),
            "0,I love it,2,13,2024-03-03T12:00:00Z,Twitter Web App,4,2,1"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,Nice quoted stuff,1,20,2024-03-02T12:00:00Z,\"Client, Inc.\",2,1,1"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_write_csv_round_trips_through_reader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv");
        write_csv(&dataset(), &path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), COLUMNS.to_vec());

        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&records[1][5], "Client, Inc.");
    }

    #[test]
    fn test_write_csv_empty_dataset_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        assert_eq!(write_csv(&Dataset::default(), &path).unwrap(), 0);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), COLUMNS.join(","));
    }

    #[test]
    fn test_to_json_uses_export_columns() {
        let value = to_json(&dataset()).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["source"], "Client, Inc.");
        assert_eq!(rows[0]["retweets"], 2);
        assert_eq!(rows[0]["date"], "2024-03-03T12:00:00Z");
        for column in COLUMNS {
            assert!(rows[0].get(column).is_some(), "missing {column}");
        }
    }

    #[test]
    fn test_write_csv_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.csv");
        std::fs::write(&path, "stale contents that are longer than a header\n".repeat(50))
            .unwrap();

        write_csv(&Dataset::default(), &path).unwrap();
        assert!(!std::fs::read_to_string(&path).unwrap().contains("stale"));
    }
}
