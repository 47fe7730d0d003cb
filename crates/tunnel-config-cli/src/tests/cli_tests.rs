//! Tests for [`crate::run`] driven through in-memory streams.

use std::ffi::OsString;
use std::io::Cursor;
use std::process::ExitCode;

use rstest::rstest;
use serde_json::{Value, json};

use crate::run;

const SS_LINK: &str = "ss://Y2hhY2hhMjAtaWV0Zi1wb2x5MTMwNTpzZWNyZXQ@1.2.3.4:8080";

struct Outcome {
    exit: ExitCode,
    stdout: String,
    stderr: String,
}

fn invoke(args: &[&str], stdin: &str) -> Outcome {
    let argv = std::iter::once("parse-tunnel-config")
        .chain(args.iter().copied())
        .map(OsString::from);
    let mut input = Cursor::new(stdin.as_bytes().to_vec());
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = run(argv, &mut input, &mut stdout, &mut stderr);
    Outcome {
        exit,
        stdout: String::from_utf8(stdout).expect("stdout is UTF-8"),
        stderr: String::from_utf8(stderr).expect("stderr is UTF-8"),
    }
}

fn envelope(outcome: &Outcome) -> Value {
    serde_json::from_str(outcome.stdout.trim()).expect("stdout carries a JSON envelope")
}

fn response(outcome: &Outcome) -> Value {
    let envelope = envelope(outcome);
    let text = envelope["value"].as_str().expect("envelope carries a value");
    serde_json::from_str(text).expect("value is a JSON response")
}

#[test]
fn stdin_config_produces_value_envelope() {
    let outcome = invoke(&[], &format!("  {SS_LINK}\n"));
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert_eq!(
        response(&outcome),
        json!({"transport": SS_LINK, "firstHop": "1.2.3.4:8080"})
    );
    assert_eq!(outcome.stdout.lines().count(), 1);
}

#[test]
fn structured_config_reports_normalized_transport() {
    let input = "transport:\n  $type: shadowsocks\n  endpoint: example.com:443\n  secret: s\n";
    let outcome = invoke(&[], input);
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    let body = response(&outcome);
    assert_eq!(body["firstHop"], json!("example.com:443"));
    let transport = body["transport"].as_str().expect("transport is text");
    assert!(transport.contains("example.com:443"), "{transport}");
    assert!(!transport.starts_with("transport"), "{transport}");
}

#[test]
fn provider_error_exits_with_failure_and_error_envelope() {
    let input = "error:\n  message: quota exceeded\n  details: daily limit\n";
    let outcome = invoke(&[], input);
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert_eq!(
        envelope(&outcome),
        json!({
            "error": {
                "code": "ERR_PROVIDER",
                "message": "quota exceeded",
                "details": {"details": "daily limit"}
            }
        })
    );
}

#[rstest]
#[case::malformed("{unclosed: [")]
#[case::empty("")]
#[case::no_port("ss://example-host-info")]
fn unusable_input_reports_invalid_config(#[case] input: &str) {
    let outcome = invoke(&[], input);
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert_eq!(envelope(&outcome)["error"]["code"], json!("ERR_INVALID_CONFIG"));
}

#[test]
fn pretty_flag_spreads_envelope_over_lines() {
    let outcome = invoke(&["--pretty"], SS_LINK);
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.lines().count() > 1, "{}", outcome.stdout);
    assert!(response(&outcome)["firstHop"] == json!("1.2.3.4:8080"));
}

#[test]
fn input_flag_reads_from_file() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, format!("{SS_LINK}\n")).expect("write config");
    let path_text = path.to_str().expect("UTF-8 path");

    let outcome = invoke(&["--input", path_text], "ignored");
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert_eq!(response(&outcome)["transport"], json!(SS_LINK));
}

#[test]
fn missing_input_file_is_reported_on_stderr() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("absent.yaml");
    let path_text = path.to_str().expect("UTF-8 path");

    let outcome = invoke(&["--input", path_text], "");
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stdout.is_empty());
    assert!(
        outcome.stderr.contains("failed to read tunnel config from"),
        "{}",
        outcome.stderr
    );
}

#[test]
fn help_is_written_to_stdout() {
    let outcome = invoke(&["--help"], "");
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stdout.contains("--input"), "{}", outcome.stdout);
    assert!(outcome.stdout.contains("--log-format"), "{}", outcome.stdout);
}

#[test]
fn unknown_flag_is_a_usage_error() {
    let outcome = invoke(&["--bogus"], "");
    assert_eq!(outcome.exit, ExitCode::from(2));
    assert!(outcome.stdout.is_empty());
    assert!(outcome.stderr.contains("--bogus"), "{}", outcome.stderr);
}

#[test]
fn compact_diagnostics_name_dialect_and_code() {
    let input = "error:\n  message: quota exceeded\n";
    let outcome = invoke(&["--log-filter", "info", "--log-format", "compact"], input);
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    let line = outcome
        .stderr
        .lines()
        .find(|line| line.contains("tunnel config rejected"))
        .expect("rejection is logged");
    assert!(line.contains("INFO"), "{line}");
    assert!(line.contains("structured"), "{line}");
    assert!(line.contains("code=ERR_PROVIDER"), "{line}");
    assert!(line.contains("input_len"), "{line}");
}

#[test]
fn json_diagnostics_carry_span_fields() {
    let outcome = invoke(&["--log-filter", "info"], SS_LINK);
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    let event: Value = outcome
        .stderr
        .lines()
        .map(|line| serde_json::from_str::<Value>(line).expect("diagnostic is JSON"))
        .find(|event| event["message"] == json!("tunnel config normalized"))
        .expect("normalization is logged");
    assert_eq!(event["dialect"], json!("legacy_url"));
    assert_eq!(event["span"]["source"], json!("stdin"));
    assert!(event["timestamp"].is_string(), "{event}");
}

#[test]
fn default_filter_keeps_stderr_quiet() {
    let outcome = invoke(&[], SS_LINK);
    assert_eq!(outcome.exit, ExitCode::SUCCESS);
    assert!(outcome.stderr.is_empty(), "{}", outcome.stderr);
}

#[test]
fn invalid_log_filter_is_reported_on_stderr() {
    let outcome = invoke(&["--log-filter", "tunnel_config=notalevel"], SS_LINK);
    assert_eq!(outcome.exit, ExitCode::FAILURE);
    assert!(outcome.stdout.is_empty());
    assert!(
        outcome.stderr.contains("invalid log filter 'tunnel_config=notalevel'"),
        "{}",
        outcome.stderr
    );
}
