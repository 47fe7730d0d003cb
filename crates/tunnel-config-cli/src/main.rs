//! CLI entrypoint for the tunnel config normalizer.
//!
//! The binary delegates to [`tunnel_config_cli::run`], which reads the config
//! from stdin or `--input`, writes the result envelope to stdout and reports
//! diagnostics on stderr.

use std::io::{self, StderrLock, StdinLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdin: StdinLock<'_> = io::stdin().lock();
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    tunnel_config_cli::run(std::env::args_os(), &mut stdin, &mut stdout, &mut stderr)
}
