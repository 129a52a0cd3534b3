//! Logging setup for sentiscope.
//!
//! Log lines go to stderr so that CSV paths, tables and JSON printed on
//! stdout can be piped. The HTTP stack is held one or two levels below the
//! crate's own level, otherwise `-v` drowns in connection-pool chatter.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable that overrides the computed filter.
///
/// Checked before `RUST_LOG`.
pub const LOG_ENV: &str = "SENTISCOPE_LOG";

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Errors only.
    Quiet,
    /// Run progress (info and above).
    #[default]
    Normal,
    /// Per-request and per-row detail.
    Verbose,
    /// Everything, including HTTP internals.
    Trace,
}

impl Verbosity {
    /// Verbosity from the `-v` count and `-q` flag; `-q` wins.
    #[must_use]
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, _) => Self::Trace,
        }
    }

    /// Level for sentiscope's own events.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::INFO,
            Self::Verbose => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    /// Level for the HTTP client crates.
    fn http_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal | Self::Verbose => Level::WARN,
            Self::Trace => Level::DEBUG,
        }
    }

    /// `EnvFilter` directives used when no environment override is set.
    #[must_use]
    pub fn directives(self) -> String {
        let http = self.http_level();
        format!(
            "sentiscope={},reqwest={http},hyper={http},hyper_util={http},rustls={http}",
            self.to_level_filter()
        )
    }
}

fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directives()))
}

/// Install the stderr subscriber.
///
/// `SENTISCOPE_LOG`, then `RUST_LOG`, take precedence over `verbosity`.
/// Later calls are no-ops.
///
/// # Examples
///
/// ```no_run
/// use sentiscope::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::from_flags(1, false));
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity != Verbosity::Normal)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    let installed = tracing_subscriber::registry()
        .with(env_filter(verbosity))
        .with(layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(?verbosity, "Logging initialized");
    }
}

/// Initialize logging for tests.
#[cfg(test)]
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
