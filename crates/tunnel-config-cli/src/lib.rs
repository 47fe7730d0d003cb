//! Command-line runtime for the tunnel config normalizer.
//!
//! Reads one tunnel config from stdin (or `--input`), runs it through
//! [`tunnel_config::parse_tunnel_config`] with the offline
//! [`EndpointFactory`], and writes the result envelope as a single JSON line
//! to stdout. The process exits non-zero when the envelope carries an error,
//! so scripts can branch on the status while still reading the structured
//! error from stdout. Diagnostics go to stderr through `tracing`.

use std::ffi::OsString;
use std::fs;
use std::io::{Read, Write};
use std::process::ExitCode;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use clap::error::ErrorKind;
use thiserror::Error;
use tracing::{info, info_span};
use tunnel_config::{Dialect, InvokeMethodResult, detect_dialect, parse_tunnel_config};

mod config;
mod endpoint;
mod telemetry;

pub use config::{DEFAULT_LOG_FILTER, LogFormat, LoggingConfig};
pub use endpoint::EndpointFactory;
pub use telemetry::{TelemetryError, with_diagnostics};

const USAGE_EXIT_CODE: u8 = 2;

/// Command-line interface for `parse-tunnel-config`.
#[derive(Parser, Debug)]
#[command(
    name = "parse-tunnel-config",
    version,
    about = "Normalizes a tunnel config and reports its transport and first hop"
)]
pub(crate) struct Cli {
    /// Reads the tunnel config from this file instead of stdin.
    #[arg(long, value_name = "PATH")]
    pub(crate) input: Option<Utf8PathBuf>,
    /// Tracing filter expression for diagnostics written to stderr.
    #[arg(long, value_name = "EXPR", default_value = DEFAULT_LOG_FILTER)]
    pub(crate) log_filter: String,
    /// Format of diagnostics written to stderr (`json` or `compact`).
    #[arg(long, value_name = "FORMAT", default_value_t = LogFormat::Json)]
    pub(crate) log_format: LogFormat,
    /// Pretty-prints the result envelope.
    #[arg(long)]
    pub(crate) pretty: bool,
}

impl Cli {
    pub(crate) fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::new(self.log_filter.as_str(), self.log_format)
    }
}

/// Errors that stop the CLI before an envelope is written.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Usage(clap::Error),
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
    #[error("failed to read tunnel config from '{path}': {source}")]
    ReadFile {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read tunnel config from stdin: {0}")]
    ReadStdin(#[source] std::io::Error),
    #[error("failed to serialize result envelope: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to write result envelope: {0}")]
    Write(#[source] std::io::Error),
}

/// Runs the CLI with the given arguments and IO handles.
#[must_use]
pub fn run<I, R, W, E>(args: I, stdin: &mut R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
{
    match execute(args, stdin, stdout, stderr) {
        Ok(exit_code) => exit_code,
        Err(CliError::Usage(error))
            if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
        {
            let _ = write!(stdout, "{}", error.render());
            ExitCode::SUCCESS
        }
        Err(CliError::Usage(error)) => {
            let _ = write!(stderr, "{}", error.render());
            ExitCode::from(USAGE_EXIT_CODE)
        }
        Err(error) => {
            let _ = writeln!(stderr, "{error}");
            ExitCode::FAILURE
        }
    }
}

fn execute<I, R, W, E>(
    args: I,
    stdin: &mut R,
    stdout: &mut W,
    stderr: &mut E,
) -> Result<ExitCode, CliError>
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
{
    let cli = Cli::try_parse_from(args).map_err(CliError::Usage)?;
    let input = read_input(cli.input.as_deref(), stdin)?;
    let source = cli.input.as_deref().map_or("stdin", Utf8Path::as_str);

    let result = with_diagnostics(&cli.logging_config(), stderr, || {
        let _span = info_span!("parse", source, input_len = input.len()).entered();
        normalize(&input)
    })?;

    write_envelope(stdout, &result, cli.pretty)?;
    if result.is_error() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn normalize(input: &str) -> InvokeMethodResult {
    let dialect = detect_dialect(input.trim()).map_or("undetected", Dialect::as_str);
    let result = parse_tunnel_config(input, &EndpointFactory);
    match result.error() {
        Some(error) => info!(dialect, code = %error.code(), "tunnel config rejected"),
        None => info!(dialect, "tunnel config normalized"),
    }
    result
}

fn read_input<R: Read>(path: Option<&Utf8Path>, stdin: &mut R) -> Result<String, CliError> {
    match path {
        Some(file) => fs::read_to_string(file).map_err(|source| CliError::ReadFile {
            path: file.to_path_buf(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            stdin
                .read_to_string(&mut buffer)
                .map_err(CliError::ReadStdin)?;
            Ok(buffer)
        }
    }
}

fn write_envelope<W: Write>(
    stdout: &mut W,
    result: &InvokeMethodResult,
    pretty: bool,
) -> Result<(), CliError> {
    let payload = if pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    }
    .map_err(CliError::Serialize)?;

    writeln!(stdout, "{payload}").map_err(CliError::Write)?;
    stdout.flush().map_err(CliError::Write)
}

#[cfg(test)]
mod tests;
