//! Diagnostics settings taken from the command line.

use strum::{Display, EnumString};

/// Filter applied when `--log-filter` is not given.
pub const DEFAULT_LOG_FILTER: &str = "warn";

/// How diagnostics are rendered on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Display)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One JSON object per event, timestamped, with span fields attached.
    #[default]
    Json,
    /// Short untimed lines showing the dialect and outcome of the run.
    Compact,
}

/// Filter expression and format for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    filter: String,
    format: LogFormat,
}

impl LoggingConfig {
    /// Creates a logging configuration.
    #[must_use]
    pub fn new(filter: impl Into<String>, format: LogFormat) -> Self {
        Self {
            filter: filter.into(),
            format,
        }
    }

    /// Returns the `tracing` filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.filter
    }

    /// Returns the output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.format
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_FILTER, LogFormat::default())
    }
}
