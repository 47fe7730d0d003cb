//! Diagnostics for a single CLI invocation.
//!
//! The subscriber lives only for one [`crate::run`] call. Events are buffered
//! and copied to the caller's stderr handle once the body returns, so tests
//! and embedders see the same lines the binary prints.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::{self, time::UtcTime};

use crate::config::{LogFormat, LoggingConfig};

/// Errors raised while preparing or flushing diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The `--log-filter` expression does not parse.
    #[error("invalid log filter '{filter}': {message}")]
    Filter {
        /// The rejected expression.
        filter: String,
        /// Parser message from `tracing-subscriber`.
        message: String,
    },
    /// Buffered diagnostics could not be copied to stderr.
    #[error("failed to write diagnostics: {0}")]
    Flush(#[source] io::Error),
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `body` under a subscriber built from `config`, then writes whatever
/// it recorded to `sink`.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] without running `body` when the filter
/// expression is invalid, and [`TelemetryError::Flush`] when `sink` rejects
/// the recorded lines.
pub fn with_diagnostics<T, E: Write>(
    config: &LoggingConfig,
    sink: &mut E,
    body: impl FnOnce() -> T,
) -> Result<T, TelemetryError> {
    let buffer = SharedBuffer::default();
    let subscriber = build_subscriber(config, buffer.clone())?;
    let output = tracing::subscriber::with_default(subscriber, body);

    let recorded = buffer.take();
    if !recorded.is_empty() {
        sink.write_all(&recorded).map_err(TelemetryError::Flush)?;
    }
    Ok(output)
}

fn build_subscriber(
    config: &LoggingConfig,
    buffer: SharedBuffer,
) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError> {
    let filter =
        EnvFilter::try_new(config.log_filter()).map_err(|error| TelemetryError::Filter {
            filter: config.log_filter().to_owned(),
            message: error.to_string(),
        })?;

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(move || buffer.clone())
        .with_ansi(false)
        .with_target(false);

    Ok(match config.log_format() {
        LogFormat::Json => Box::new(
            builder
                .with_timer(UtcTime::rfc_3339())
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(false)
                .finish(),
        ),
        LogFormat::Compact => Box::new(builder.without_time().compact().finish()),
    })
}
