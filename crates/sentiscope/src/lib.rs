//! `sentiscope` - sentiment analysis of a social-media timeline
//!
//! Fetches an account's posts from a v1.1-style REST API, strips mentions,
//! links and punctuation, scores each post with a polarity lexicon, then
//! exports the table as CSV and charts sentiment over time as SVG.
//!
//! ```no_run
//! # async fn run() -> sentiscope::Result<()> {
//! use sentiscope::{AnalyzeOptions, ApiClient, Config, FetchRequest, Pipeline, SentimentAnalyzer};
//!
//! let config = Config::load()?;
//! let client = ApiClient::from_config(&config.api)?;
//! let analyzer = SentimentAnalyzer::from_config(&config)?;
//!
//! let report = Pipeline::new(&client, &analyzer)
//!     .run(&AnalyzeOptions::new(FetchRequest::user("rustlang", 50)))
//!     .await?;
//! println!("{} positive of {}", report.summary.positive, report.summary.total);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod archive;
pub mod chart;
pub mod clean;
pub mod cli;
pub mod client;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod logging;
pub mod pipeline;
pub mod post;
pub mod sentiment;
pub mod storage;

pub use archive::Archive;
pub use clean::TextCleaner;
pub use client::{ApiClient, Friend};
pub use config::Config;
pub use dataset::{AnalyzedPost, Dataset, Summary};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use pipeline::{AnalysisReport, AnalyzeOptions, Pipeline};
pub use post::{FetchRequest, Post, PostSource, Timeline};
pub use sentiment::{Score, Sentiment, SentimentAnalyzer};
pub use storage::{Storage, StorageStats, StoredPost};
