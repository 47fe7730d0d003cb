//! Tests for response assembly and first-hop reconciliation.

use rstest::rstest;
use serde_json::json;
use tunnel_config_core::{ClientMetadata, ConnectionProviderInfo, ErrorCode, PlatformError};

use super::{factory_expecting, factory_failing};
use crate::{assemble_response, reconcile_first_hop};

#[rstest]
#[case::equal("1.2.3.4:8080", "1.2.3.4:8080", "1.2.3.4:8080")]
#[case::different_port("1.2.3.4:8080", "1.2.3.4:53", "")]
#[case::different_host("a.example:443", "b.example:443", "")]
#[case::both_empty("", "", "")]
#[case::stream_only("1.2.3.4:8080", "", "")]
#[case::case_sensitive("Example.com:443", "example.com:443", "")]
fn reconciles_first_hop(#[case] stream: &str, #[case] packet: &str, #[case] expected: &str) {
    let first_hop = reconcile_first_hop(stream, packet);
    assert_eq!(first_hop, expected);
    assert!(first_hop.is_empty() || (first_hop == stream && first_hop == packet));
}

#[test]
fn shared_first_hop_is_reported() {
    let factory = factory_expecting("ss://example-host-info", ClientMetadata::shared("1.2.3.4:8080"));
    let json = assemble_response(&factory, String::from("ss://example-host-info"))
        .expect("response assembles");
    let value: serde_json::Value = serde_json::from_str(&json).expect("response is JSON");
    assert_eq!(
        value,
        json!({"transport": "ss://example-host-info", "firstHop": "1.2.3.4:8080"})
    );
}

#[test]
fn diverging_first_hops_leave_first_hop_empty() {
    let client = ClientMetadata::new(
        ConnectionProviderInfo::new("tcp.example.com:443"),
        ConnectionProviderInfo::new("udp.example.com:53"),
    );
    let factory = factory_expecting("transport text", client);
    let json = assemble_response(&factory, String::from("transport text")).expect("response assembles");
    insta::assert_snapshot!(json, @r#"{"firstHop":"","transport":"transport text"}"#);
}

#[test]
fn factory_error_passes_through_unchanged() {
    let original = PlatformError::new(ErrorCode::Unauthenticated, "bad secret")
        .with_detail("server", "1.2.3.4")
        .with_cause(PlatformError::new(ErrorCode::InternalError, "handshake"));
    let factory = factory_failing(original.clone());
    let error = assemble_response(&factory, String::from("ss://x")).expect_err("factory fails");
    assert_eq!(error, original);
}
