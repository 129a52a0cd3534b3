//! Time-series chart of sentiment, rendered to SVG.

use std::path::Path;

use chrono::{DateTime, Utc};
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use tracing::info;

use crate::config::ChartConfig;
use crate::error::{Error, Result};
use crate::sentiment::Sentiment;

/// Chart title.
pub const TITLE: &str = "Sentiments Analysis";

/// Padding added on both sides of a single-instant series, in seconds.
const SINGLE_POINT_PAD_SECS: i64 = 3600;

/// Dot length and gap of the sentiment line, in pixels.
const DOT_SIZE: i32 = 2;
const DOT_GAP: i32 = 4;

/// Spans longer than this get date-only tick labels.
const DATE_ONLY_SPAN_SECS: i64 = 2 * 24 * 3600;

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartOptions {
    /// Title drawn above the plot.
    pub title: String,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self::from_config(&ChartConfig::default())
    }
}

impl ChartOptions {
    /// Options from the `chart` config section.
    #[must_use]
    pub fn from_config(config: &ChartConfig) -> Self {
        Self {
            title: TITLE.to_string(),
            width: config.width,
            height: config.height,
        }
    }

    /// Same options with a different title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }
}

/// Label for a y-axis tick; only -1, 0 and 1 are labelled.
fn axis_label(value: f64) -> String {
    let nearest = value.round();
    if (value - nearest).abs() > 1e-6 {
        return String::new();
    }
    #[allow(clippy::cast_possible_truncation)]
    let nearest = nearest as i64;
    Sentiment::from_value(nearest)
        .map(|s| s.label().to_string())
        .unwrap_or_default()
}

/// x range in unix seconds, never empty.
fn time_range(points: &[(i64, f64)]) -> (i64, i64) {
    let start = points.iter().map(|(t, _)| *t).min().unwrap_or(0);
    let end = points.iter().map(|(t, _)| *t).max().unwrap_or(0);
    if start == end {
        (start - SINGLE_POINT_PAD_SECS, end + SINGLE_POINT_PAD_SECS)
    } else {
        (start, end)
    }
}

fn tick_label(ts: i64, span: i64) -> String {
    let Some(date) = DateTime::<Utc>::from_timestamp(ts, 0) else {
        return String::new();
    };
    if span > DATE_ONLY_SPAN_SECS {
        date.format("%Y-%m-%d").to_string()
    } else {
        date.format("%m-%d %H:%M").to_string()
    }
}

/// Render `series` (sorted oldest first) as an SVG line chart at `path`.
///
/// # Errors
///
/// Returns [`Error::EmptyDataset`] for an empty series, or a chart error if
/// the file cannot be written.
pub fn render_svg(
    series: &[(DateTime<Utc>, Sentiment)],
    path: impl AsRef<Path>,
    options: &ChartOptions,
) -> Result<()> {
    let path = path.as_ref();
    if series.is_empty() {
        return Err(Error::EmptyDataset);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let points: Vec<(i64, f64)> = series
        .iter()
        .map(|(date, sentiment)| (date.timestamp(), f64::from(sentiment.value())))
        .collect();
    let (start, end) = time_range(&points);
    let span = end - start;
    let chart_err = |e: &dyn std::fmt::Display| Error::chart(path, e.to_string());

    let root = SVGBackend::new(path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| chart_err(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&options.title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(start..end, -1.25f64..1.25f64)
        .map_err(|e| chart_err(&e))?;

    let x_formatter = |ts: &i64| tick_label(*ts, span);
    let y_formatter = |v: &f64| axis_label(*v);
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Sentiment")
        .x_labels(8)
        .y_labels(3)
        .x_label_formatter(&x_formatter)
        .y_label_formatter(&y_formatter)
        .draw()
        .map_err(|e| chart_err(&e))?;

    chart
        .draw_series(DashedLineSeries::new(
            points.iter().copied(),
            DOT_SIZE,
            DOT_GAP,
            GREEN.stroke_width(2),
        ))
        .map_err(|e| chart_err(&e))?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&point| Circle::new(point, 4, GREEN.filled())),
        )
        .map_err(|e| chart_err(&e))?;

    root.present().map_err(|e| chart_err(&e))?;
    info!(path = %path.display(), points = points.len(), "Rendered chart");
    Ok(())
}
