//! `sentiscope` - CLI for timeline sentiment analysis

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::Parser;

use sentiscope::chart::{self, ChartOptions};
use sentiscope::cli::{
    AnalyzeCommand, Cli, Command, ConfigCommand, FetchCommand, FriendsCommand, HistoryCommand,
    OutputFormat, PruneCommand, ScoreCommand,
};
use sentiscope::{
    export, init_logging, AnalysisReport, AnalyzeOptions, ApiClient, Archive, Config, Dataset,
    Pipeline, PostSource, SentimentAnalyzer, Storage, StoredPost, Summary,
};

const TEXT_WIDTH: usize = 60;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    // These two must work even when the config file is broken
    if let Command::Config(ConfigCommand::Path) = cli.command {
        println!("{}", Config::default_config_path().display());
        return Ok(());
    }
    if let Command::Config(ConfigCommand::Validate { file }) = &cli.command {
        return handle_validate(file.clone().or_else(|| cli.config.clone()));
    }

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    match cli.command {
        Command::Analyze(cmd) => handle_analyze(&config, &cmd).await,
        Command::Fetch(cmd) => handle_fetch(&config, &cmd).await,
        Command::Friends(cmd) => handle_friends(&config, &cmd).await,
        Command::Score(cmd) => handle_score(&config, &cmd),
        Command::History(cmd) => handle_history(&config, &cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Prune(cmd) => handle_prune(&config, &cmd),
        Command::Config(cmd) => handle_config(&config, &cmd),
    }
}

fn open_storage(config: &Config) -> Result<Storage> {
    let path = config.database_path();
    Storage::open(&path).with_context(|| format!("failed to open {}", path.display()))
}

async fn handle_analyze(config: &Config, cmd: &AnalyzeCommand) -> Result<()> {
    let request = cmd.timeline.request(config.api.default_count);
    let analyzer = SentimentAnalyzer::from_config(config)?;

    let source: Box<dyn PostSource> = match &cmd.input {
        Some(path) => Box::new(Archive::new(path)),
        None => Box::new(ApiClient::from_config(&config.api)?),
    };

    let storage = if config.storage.enabled && !cmd.no_store {
        Some(open_storage(config)?)
    } else {
        None
    };

    let options = AnalyzeOptions {
        request,
        export_path: Some(
            cmd.export
                .clone()
                .unwrap_or_else(|| config.export.path.clone()),
        ),
        chart_path: if cmd.no_chart {
            None
        } else {
            Some(cmd.chart.clone().unwrap_or_else(|| config.chart.path.clone()))
        },
        chart: ChartOptions::from_config(&config.chart),
    };

    let mut pipeline = Pipeline::new(source.as_ref(), &analyzer);
    if let Some(storage) = &storage {
        pipeline = pipeline.with_storage(storage);
    }
    let report = pipeline
        .run(&options)
        .await
        .with_context(|| format!("analysis of @{} failed", options.request.screen_name))?;

    print_report(&report, cmd.format)
}

fn print_report(report: &AnalysisReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "screen_name": report.screen_name,
                "source": report.source,
                "summary": report.summary,
                "rows": export::to_json(&report.dataset)?,
                "export_path": report.export_path,
                "chart_path": report.chart_path,
                "stored_new": report.stored_new,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            print_rows(report.dataset.rows().iter().map(|row| RowView {
                id: row.id,
                date: row.date.format("%Y-%m-%d %H:%M").to_string(),
                sentiment: row.sentiment.label(),
                polarity: row.polarity,
                text: &row.cleaned,
            }));
            println!();
            print_summary(&report.summary);
        }
        OutputFormat::Plain => {
            println!(
                "Analyzed {} posts from @{} ({})",
                report.summary.total, report.screen_name, report.source
            );
            print_summary(&report.summary);
            if let Some(path) = &report.export_path {
                println!("Spreadsheet:  {}", path.display());
            }
            if let Some(path) = &report.chart_path {
                println!("Chart:        {}", path.display());
            }
            if let Some(new) = report.stored_new {
                println!("Stored:       {new} new");
            }
        }
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    for sentiment in sentiscope::Sentiment::ALL.iter().rev() {
        println!(
            "{:<13} {:>5} ({:.1}%)",
            format!("{}:", sentiment.label()),
            summary.count(*sentiment),
            summary.percent(*sentiment)
        );
    }
    println!("Mean polarity: {:+.3}", summary.mean_polarity);
}

struct RowView<'a> {
    id: u64,
    date: String,
    sentiment: &'static str,
    polarity: f64,
    text: &'a str,
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

fn print_rows<'a>(rows: impl Iterator<Item = RowView<'a>>) {
    println!(
        "{:<20} {:<16} {:<9} {:>7}  TEXT",
        "ID", "DATE", "SENTIMENT", "SCORE"
    );
    for row in rows {
        println!(
            "{:<20} {:<16} {:<9} {:>+7.3}  {}",
            row.id,
            row.date,
            row.sentiment,
            row.polarity,
            truncate(row.text, TEXT_WIDTH)
        );
    }
}

async fn handle_fetch(config: &Config, cmd: &FetchCommand) -> Result<()> {
    let request = cmd.timeline.request(config.api.default_count);
    let client = ApiClient::from_config(&config.api)?;

    let statuses = client
        .timeline_raw(&request)
        .await
        .with_context(|| format!("failed to fetch posts for @{}", request.screen_name))?;
    let written = Archive::new(&cmd.save).append(&statuses)?;

    println!("Saved {written} posts to {}", cmd.save.display());
    Ok(())
}

async fn handle_friends(config: &Config, cmd: &FriendsCommand) -> Result<()> {
    let client = ApiClient::from_config(&config.api)?;
    let screen_name = cmd.screen_name.trim_start_matches('@');
    let count = cmd.count.unwrap_or(config.api.default_count);

    let friends = client
        .friends(screen_name, count)
        .await
        .with_context(|| format!("failed to list friends of @{screen_name}"))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&friends)?);
    } else {
        for friend in &friends {
            println!(
                "@{:<20} {:<30} {:>9} followers",
                friend.screen_name,
                truncate(&friend.name, 30),
                friend.followers
            );
        }
        println!("{} accounts", friends.len());
    }
    Ok(())
}

fn handle_score(config: &Config, cmd: &ScoreCommand) -> Result<()> {
    let analyzer = SentimentAnalyzer::from_config(config)?;
    let scores: Vec<_> = cmd.text.iter().map(|text| analyzer.analyze(text)).collect();

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&scores)?);
    } else {
        for score in &scores {
            println!(
                "{:<9} {:+.3}  {}",
                score.sentiment.label(),
                score.polarity,
                score.cleaned
            );
        }
    }
    Ok(())
}

fn handle_history(config: &Config, cmd: &HistoryCommand) -> Result<()> {
    let storage = open_storage(config)?;
    let screen_name = cmd.screen_name.trim_start_matches('@');
    let stored = storage.recent_for_user(screen_name, cmd.limit)?;

    if let Some(path) = &cmd.chart {
        let dataset = Dataset::from_rows(stored.iter().map(|s| s.post.clone()).collect());
        chart::render_svg(&dataset.series(), path, &ChartOptions::from_config(&config.chart))
            .with_context(|| format!("failed to chart history of @{screen_name}"))?;
        println!("Chart:        {}", path.display());
    }

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stored)?),
        OutputFormat::Table => print_rows(stored.iter().map(stored_view)),
        OutputFormat::Plain => {
            for post in &stored {
                println!(
                    "[{}] {} {}",
                    post.post.date.format("%Y-%m-%d %H:%M"),
                    post.post.sentiment.label(),
                    post.post.cleaned
                );
            }
        }
    }

    if stored.is_empty() && cmd.format != OutputFormat::Json {
        println!("No stored posts for @{screen_name}");
    }
    Ok(())
}

fn stored_view(stored: &StoredPost) -> RowView<'_> {
    RowView {
        id: stored.post.id,
        date: stored.post.date.format("%Y-%m-%d %H:%M").to_string(),
        sentiment: stored.post.sentiment.label(),
        polarity: stored.post.polarity,
        text: &stored.post.cleaned,
    }
}

fn handle_status(config: &Config, json: bool) -> Result<()> {
    let storage = open_storage(config)?;
    let stats = storage.stats()?;

    if json {
        let status = serde_json::json!({
            "database_path": storage.path(),
            "storage_enabled": config.storage.enabled,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let fmt_date = |d: Option<chrono::DateTime<chrono::Utc>>| {
            d.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
        };
        println!("sentiscope status");
        println!("-----------------");
        println!("Database:      {}", storage.path().display());
        println!("Recording:     {}", config.storage.enabled);
        println!("Posts:         {}", stats.total_posts);
        println!("Accounts:      {}", stats.distinct_users);
        println!(
            "Buckets:       {} positive, {} neutral, {} negative",
            stats.positive, stats.neutral, stats.negative
        );
        println!("Oldest post:   {}", fmt_date(stats.oldest_post));
        println!("Newest post:   {}", fmt_date(stats.newest_post));
        println!("Size:          {} bytes", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_prune(config: &Config, cmd: &PruneCommand) -> Result<()> {
    let storage = open_storage(config)?;
    let from_config = cmd.max_age_days.is_none() && cmd.keep.is_none();

    let max_age = match cmd.max_age_days {
        Some(0) => None,
        Some(days) => Some(chrono::Duration::days(i64::from(days))),
        None if from_config => config.max_age(),
        None => None,
    };
    let keep = match cmd.keep {
        Some(n) => Some(n),
        None if from_config && config.storage.max_posts > 0 => Some(config.storage.max_posts),
        None => None,
    };

    let mut removed = 0;
    if let Some(max_age) = max_age {
        removed += storage.prune_older_than(max_age)?;
    }
    if let Some(keep) = keep {
        removed += storage.prune_keep_recent(keep)?;
    }

    println!("Removed {removed} posts, {} remain", storage.count()?);
    Ok(())
}

fn handle_validate(file: Option<std::path::PathBuf>) -> Result<()> {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());
    Config::load_from(Some(path.clone()))
        .with_context(|| format!("invalid configuration in {}", path.display()))?;
    println!("Configuration is valid.");
    Ok(())
}

fn handle_config(config: &Config, cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if *json {
                let mut shown = config.clone();
                if shown.api.bearer_token.is_some() {
                    shown.api.bearer_token = Some("<redacted>".to_string());
                }
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else {
                let token = if config.api.bearer_token.is_some() {
                    "set"
                } else {
                    "not set"
                };
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[API]");
                println!("  Base URL:           {}", config.api.base_url);
                println!("  Bearer token:       {token}");
                println!("  Timeout (secs):     {}", config.api.timeout_secs);
                println!("  Default count:      {}", config.api.default_count);
                println!();
                println!("[Analysis]");
                println!(
                    "  Extra patterns:     {}",
                    config.clean.extra_patterns.len()
                );
                println!(
                    "  Lexicon overrides:  {}",
                    config
                        .sentiment
                        .lexicon_path
                        .as_ref()
                        .map_or_else(|| "none".to_string(), |p| p.display().to_string())
                );
                println!();
                println!("[Output]");
                println!("  Spreadsheet:        {}", config.export.path.display());
                println!(
                    "  Chart:              {} ({}x{})",
                    config.chart.path.display(),
                    config.chart.width,
                    config.chart.height
                );
                println!();
                println!("[Storage]");
                println!("  Enabled:            {}", config.storage.enabled);
                println!("  Database path:      {}", config.database_path().display());
                println!("  Max posts:          {}", config.storage.max_posts);
                println!("  Max age (days):     {}", config.storage.max_age_days);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            handle_validate(file.clone())?;
        }
    }
    Ok(())
}
