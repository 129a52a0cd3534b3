//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::post::{FetchRequest, Timeline};

fn parse_count(s: &str) -> Result<u32, String> {
    let count: u32 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if count == 0 {
        return Err("count must be at least 1".to_string());
    }
    Ok(count)
}

/// Which account's posts to fetch.
#[derive(Debug, Clone, Args)]
pub struct TimelineArgs {
    /// Account screen name (without the @)
    pub screen_name: String,

    /// Number of posts to fetch [default: api.default_count]
    #[arg(short = 'n', long, value_parser = parse_count)]
    pub count: Option<u32>,

    /// Read the authenticated account's home feed instead
    #[arg(long)]
    pub home: bool,
}

impl TimelineArgs {
    /// Build the fetch request, falling back to `default_count`.
    #[must_use]
    pub fn request(&self, default_count: u32) -> FetchRequest {
        FetchRequest {
            screen_name: self.screen_name.trim_start_matches('@').to_string(),
            count: self.count.unwrap_or(default_count),
            timeline: if self.home {
                Timeline::Home
            } else {
                Timeline::User
            },
        }
    }
}

/// Analyze command arguments.
#[derive(Debug, Args)]
pub struct AnalyzeCommand {
    /// Posts to analyze
    #[command(flatten)]
    pub timeline: TimelineArgs,

    /// Read posts from a JSON-lines archive instead of the API
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// CSV output path [default: export.path]
    #[arg(short, long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// SVG chart path [default: chart.path]
    #[arg(long, value_name = "PATH", conflicts_with = "no_chart")]
    pub chart: Option<PathBuf>,

    /// Skip rendering the chart
    #[arg(long)]
    pub no_chart: bool,

    /// Do not record the analysis in the history database
    #[arg(long)]
    pub no_store: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// Fetch command arguments.
#[derive(Debug, Args)]
pub struct FetchCommand {
    /// Posts to fetch
    #[command(flatten)]
    pub timeline: TimelineArgs,

    /// Append raw statuses to this JSON-lines file
    #[arg(short, long, value_name = "FILE")]
    pub save: PathBuf,
}

/// Friends command arguments.
#[derive(Debug, Args)]
pub struct FriendsCommand {
    /// Account screen name (without the @)
    pub screen_name: String,

    /// Maximum number of accounts to list [default: api.default_count]
    #[arg(short = 'n', long, value_parser = parse_count)]
    pub count: Option<u32>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Score command arguments.
#[derive(Debug, Args)]
pub struct ScoreCommand {
    /// Text to score; each argument is scored separately
    #[arg(required = true)]
    pub text: Vec<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// History command arguments.
#[derive(Debug, Args)]
pub struct HistoryCommand {
    /// Account screen name (without the @)
    pub screen_name: String,

    /// Maximum number of stored posts to show
    #[arg(short, long, default_value = "20")]
    pub limit: usize,

    /// Also chart the stored posts to this SVG file
    #[arg(long, value_name = "PATH")]
    pub chart: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Prune command arguments.
///
/// With neither flag, both limits come from the `storage` config section.
#[derive(Debug, Args)]
pub struct PruneCommand {
    /// Delete posts published more than N days ago
    #[arg(long, value_name = "N")]
    pub max_age_days: Option<u32>,

    /// Keep only the N most recent posts
    #[arg(long, value_name = "N")]
    pub keep: Option<usize>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}
