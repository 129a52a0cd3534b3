//! Tabular view of analyzed posts.
//!
//! One [`AnalyzedPost`] row per fetched post, in fetch order. This is what
//! gets exported, stored and charted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::post::Post;
use crate::sentiment::{Sentiment, SentimentAnalyzer};

/// One row of the analysis table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPost {
    /// Post text after noise stripping.
    pub cleaned: String,
    /// Platform-assigned identifier.
    pub id: u64,
    /// Length of the raw text in characters.
    pub len: usize,
    /// When the post was published.
    pub date: DateTime<Utc>,
    /// Client the post was published from.
    pub source: String,
    /// Like count.
    pub likes: u64,
    /// Repost count.
    pub reposts: u64,
    /// Mean lexicon polarity.
    pub polarity: f64,
    /// Bucketed polarity.
    pub sentiment: Sentiment,
    /// Screen name of the author, when the source reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

impl AnalyzedPost {
    /// Analyze a single post.
    #[must_use]
    pub fn from_post(post: &Post, analyzer: &SentimentAnalyzer) -> Self {
        let score = analyzer.analyze(&post.text);
        Self {
            cleaned: score.cleaned,
            id: post.id,
            len: post.text_len(),
            date: post.created_at,
            source: post.source.clone(),
            likes: post.likes,
            reposts: post.reposts,
            polarity: score.polarity,
            sentiment: score.sentiment,
            author: post.author.clone(),
        }
    }
}

/// Per-bucket counts over a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    /// Number of rows.
    pub total: usize,
    /// Rows scored positive.
    pub positive: usize,
    /// Rows scored neutral.
    pub neutral: usize,
    /// Rows scored negative.
    pub negative: usize,
    /// Mean polarity over all rows (0.0 when empty).
    pub mean_polarity: f64,
}

impl Summary {
    /// Count for one bucket.
    #[must_use]
    pub fn count(&self, sentiment: Sentiment) -> usize {
        match sentiment {
            Sentiment::Positive => self.positive,
            Sentiment::Neutral => self.neutral,
            Sentiment::Negative => self.negative,
        }
    }

    /// Share of rows in one bucket, in percent.
    #[must_use]
    pub fn percent(&self, sentiment: Sentiment) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let pct = self.count(sentiment) as f64 * 100.0 / self.total as f64;
        pct
    }
}

/// Analyzed posts in fetch order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    rows: Vec<AnalyzedPost>,
}

impl Dataset {
    /// Analyze every post, keeping the input order.
    #[must_use]
    pub fn from_posts(posts: &[Post], analyzer: &SentimentAnalyzer) -> Self {
        Self {
            rows: posts
                .iter()
                .map(|post| AnalyzedPost::from_post(post, analyzer))
                .collect(),
        }
    }

    /// Wrap already-analyzed rows.
    #[must_use]
    pub fn from_rows(rows: Vec<AnalyzedPost>) -> Self {
        Self { rows }
    }

    /// Rows in order.
    #[must_use]
    pub fn rows(&self) -> &[AnalyzedPost] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Bucket counts and mean polarity.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut summary = Summary {
            total: self.rows.len(),
            ..Summary::default()
        };

        let mut polarity_sum = 0.0;
        for row in &self.rows {
            polarity_sum += row.polarity;
            match row.sentiment {
                Sentiment::Positive => summary.positive += 1,
                Sentiment::Neutral => summary.neutral += 1,
                Sentiment::Negative => summary.negative += 1,
            }
        }

        if summary.total > 0 {
            #[allow(clippy::cast_precision_loss)]
            let total = summary.total as f64;
            summary.mean_polarity = polarity_sum / total;
        }
        summary
    }

    /// `(date, sentiment)` points sorted by date, oldest first.
    ///
    /// Posts sharing a timestamp keep their relative order.
    #[must_use]
    pub fn series(&self) -> Vec<(DateTime<Utc>, Sentiment)> {
        let mut points: Vec<_> = self.rows.iter().map(|r| (r.date, r.sentiment)).collect();
        points.sort_by_key(|(date, _)| *date);
        points
    }
}
