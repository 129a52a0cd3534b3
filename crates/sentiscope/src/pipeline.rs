//! The fetch, score, export, store and chart run behind `analyze`.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

use crate::chart::{self, ChartOptions};
use crate::dataset::{Dataset, Summary};
use crate::error::Result;
use crate::export;
use crate::post::{FetchRequest, PostSource};
use crate::sentiment::SentimentAnalyzer;
use crate::storage::Storage;

/// What one analysis run should produce.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Posts to fetch.
    pub request: FetchRequest,
    /// CSV destination; `None` skips the export.
    pub export_path: Option<PathBuf>,
    /// SVG destination; `None` skips the chart.
    pub chart_path: Option<PathBuf>,
    /// Chart title and size.
    pub chart: ChartOptions,
}

impl AnalyzeOptions {
    /// Options that only fetch and score.
    #[must_use]
    pub fn new(request: FetchRequest) -> Self {
        Self {
            request,
            export_path: None,
            chart_path: None,
            chart: ChartOptions::default(),
        }
    }
}

/// Outcome of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Account the posts were fetched for.
    pub screen_name: String,
    /// Name of the [`PostSource`] used.
    pub source: &'static str,
    /// Per-bucket counts.
    pub summary: Summary,
    /// The analysed rows.
    pub dataset: Dataset,
    /// Where the CSV was written.
    pub export_path: Option<PathBuf>,
    /// Where the chart was written.
    pub chart_path: Option<PathBuf>,
    /// Posts not previously stored, when history is enabled.
    pub stored_new: Option<usize>,
}

/// Runs analyses against one post source.
pub struct Pipeline<'a> {
    source: &'a dyn PostSource,
    analyzer: &'a SentimentAnalyzer,
    storage: Option<&'a Storage>,
}

impl std::fmt::Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("source", &self.source.name())
            .field("storage", &self.storage.map(Storage::path))
            .finish_non_exhaustive()
    }
}

impl<'a> Pipeline<'a> {
    /// Pipeline reading from `source` and scoring with `analyzer`.
    #[must_use]
    pub fn new(source: &'a dyn PostSource, analyzer: &'a SentimentAnalyzer) -> Self {
        Self {
            source,
            analyzer,
            storage: None,
        }
    }

    /// Also record every analysed post in `storage`.
    #[must_use]
    pub fn with_storage(mut self, storage: &'a Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Fetch, score, then export, store and chart as requested.
    ///
    /// The export is written before the chart, so an empty timeline still
    /// leaves a header-only CSV behind.
    ///
    /// # Errors
    ///
    /// Returns the first error from fetching, exporting, storing or
    /// charting. Charting an empty dataset fails with
    /// [`Error::EmptyDataset`](crate::Error::EmptyDataset).
    pub async fn run(&self, options: &AnalyzeOptions) -> Result<AnalysisReport> {
        let request = &options.request;
        info!(
            screen_name = %request.screen_name,
            count = request.count,
            timeline = %request.timeline,
            source = self.source.name(),
            "Starting analysis"
        );

        let posts = self.source.fetch(request).await?;
        if posts.is_empty() {
            warn!(screen_name = %request.screen_name, "No posts fetched");
        }

        let dataset = Dataset::from_posts(&posts, self.analyzer);
        let summary = dataset.summary();

        if let Some(path) = &options.export_path {
            export::write_csv(&dataset, path)?;
        }

        let stored_new = match self.storage {
            Some(storage) => Some(storage.upsert_dataset(&request.screen_name, &dataset)?),
            None => None,
        };

        if let Some(path) = &options.chart_path {
            chart::render_svg(&dataset.series(), path, &options.chart)?;
        }

        info!(
            screen_name = %request.screen_name,
            total = summary.total,
            positive = summary.positive,
            neutral = summary.neutral,
            negative = summary.negative,
            "Analysis complete"
        );

        Ok(AnalysisReport {
            screen_name: request.screen_name.clone(),
            source: self.source.name(),
            summary,
            dataset,
            export_path: options.export_path.clone(),
            chart_path: options.chart_path.clone(),
            stored_new,
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::Error;
    use crate::logging::init_test_logging;
    use crate::post::fixtures::post;
    use crate::post::Post;

    struct StaticSource(Vec<Post>);

    #[async_trait]
    impl PostSource for StaticSource {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn fetch(&self, request: &FetchRequest) -> Result<Vec<Post>> {
            Ok(self.0.iter().take(request.count as usize).cloned().collect())
        }
    }

    fn source() -> StaticSource {
        StaticSource(vec![
            post(3, 3, "Such a great release!"),
            post(2, 2, "@bob that was terrible"),
            post(1, 1, "Shipping tomorrow"),
        ])
    }

    #[tokio::test]
    async fn test_run_scores_without_outputs() {
        init_test_logging();
        let source = source();
        let analyzer = SentimentAnalyzer::new();

        let report = Pipeline::new(&source, &analyzer)
            .run(&AnalyzeOptions::new(FetchRequest::user("alice", 2)))
            .await
            .unwrap();

        assert_eq!(report.source, "static");
        assert_eq!(report.screen_name, "alice");
        assert_eq!(report.dataset.len(), 2);
        assert_eq!(report.summary.positive, 1);
        assert_eq!(report.summary.negative, 1);
        assert!(report.stored_new.is_none());
        assert!(report.export_path.is_none());
    }

    #[tokio::test]
    async fn test_run_writes_export_chart_and_history() {
        init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let source = source();
        let analyzer = SentimentAnalyzer::new();
        let storage = Storage::open_in_memory().unwrap();

        let options = AnalyzeOptions {
            export_path: Some(dir.path().join("output.csv")),
            chart_path: Some(dir.path().join("sentiment.svg")),
            ..AnalyzeOptions::new(FetchRequest::user("alice", 10))
        };
        let pipeline = Pipeline::new(&source, &analyzer).with_storage(&storage);

        let report = pipeline.run(&options).await.unwrap();
        assert_eq!(report.stored_new, Some(3));
        assert!(dir.path().join("output.csv").exists());
        assert!(dir.path().join("sentiment.svg").exists());
        assert_eq!(storage.recent_for_user("alice", 10).unwrap().len(), 3);

        let again = pipeline.run(&options).await.unwrap();
        assert_eq!(again.stored_new, Some(0));
    }

    #[tokio::test]
    async fn test_run_home_timeline_stores_by_author() {
        init_test_logging();
        let mut by_bob = post(9, 4, "Lovely morning");
        by_bob.author = Some("bob".to_string());
        let mut unknown = post(8, 3, "Nothing much");
        unknown.author = None;
        let source = StaticSource(vec![by_bob, unknown, post(7, 2, "good stuff")]);
        let analyzer = SentimentAnalyzer::new();
        let storage = Storage::open_in_memory().unwrap();

        let report = Pipeline::new(&source, &analyzer)
            .with_storage(&storage)
            .run(&AnalyzeOptions::new(FetchRequest::home("alice", 10)))
            .await
            .unwrap();
        assert_eq!(report.stored_new, Some(3));

        let ids = |name: &str| -> Vec<u64> {
            storage
                .recent_for_user(name, 10)
                .unwrap()
                .iter()
                .map(|p| p.post.id)
                .collect()
        };
        assert_eq!(ids("bob"), vec![9]);
        assert_eq!(ids("alice"), vec![8, 7]);
        assert_eq!(storage.stats().unwrap().distinct_users, 2);
    }

    #[tokio::test]
    async fn test_run_empty_timeline_chart_fails_after_export() {
        init_test_logging();
        let dir = tempfile::tempdir().unwrap();
        let source = StaticSource(Vec::new());
        let analyzer = SentimentAnalyzer::new();

        let options = AnalyzeOptions {
            export_path: Some(dir.path().join("output.csv")),
            chart_path: Some(dir.path().join("sentiment.svg")),
            ..AnalyzeOptions::new(FetchRequest::user("alice", 10))
        };
        let err = Pipeline::new(&source, &analyzer)
            .run(&options)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::EmptyDataset));
        assert!(dir.path().join("output.csv").exists());
        assert!(!dir.path().join("sentiment.svg").exists());
    }
}
