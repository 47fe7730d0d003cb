//! Unit tests for the CLI runtime.

mod cli_tests;
mod endpoint_tests;
