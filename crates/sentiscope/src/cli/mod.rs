//! Command-line interface for sentiscope.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AnalyzeCommand, ConfigCommand, FetchCommand, FriendsCommand, HistoryCommand, OutputFormat,
    PruneCommand, ScoreCommand, StatusCommand, TimelineArgs,
};

use crate::logging::Verbosity;

/// sentiscope - Chart the sentiment of a social-media timeline
///
/// Fetches an account's recent posts, scores each one as positive, neutral
/// or negative, writes the table to CSV and plots sentiment over time.
#[derive(Debug, Parser)]
#[command(name = "sentiscope")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch, score, export and chart an account's posts
    Analyze(AnalyzeCommand),

    /// Save raw posts to a JSON-lines archive
    Fetch(FetchCommand),

    /// List the accounts a user follows
    Friends(FriendsCommand),

    /// Score text given on the command line
    Score(ScoreCommand),

    /// Show stored analyses for an account
    History(HistoryCommand),

    /// Show history database statistics
    Status(StatusCommand),

    /// Delete old posts from the history database
    Prune(PruneCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}
