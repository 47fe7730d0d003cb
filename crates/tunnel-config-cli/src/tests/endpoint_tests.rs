//! Tests for first-hop derivation in [`EndpointFactory`].

use rstest::rstest;
use tunnel_config::{ErrorCode, PlatformError, TransportClient, TransportFactory};

use crate::EndpointFactory;

fn hops(config: &str) -> (String, String) {
    let client = EndpointFactory
        .new_client(config)
        .expect("config should produce a client");
    (
        client.stream_info().first_hop().to_owned(),
        client.packet_info().first_hop().to_owned(),
    )
}

fn failure(config: &str) -> PlatformError {
    match EndpointFactory.new_client(config) {
        Ok(_) => panic!("config should be rejected: {config}"),
        Err(error) => error,
    }
}

#[rstest]
#[case::ss_link("ss://Y2hhY2hhMjAtaWV0Zi1wb2x5MTMwNTpzZWNyZXQ@1.2.3.4:8080", "1.2.3.4:8080")]
#[case::ss_link_with_query("ss://Y2hhY2hhMjA@example.com:443/?outline=1#name", "example.com:443")]
#[case::legacy_mapping("server: 1.2.3.4\nserver_port: 8080\npassword: secret", "1.2.3.4:8080")]
#[case::legacy_json(r#"{"server":"1.2.3.4","server_port":8388,"method":"aes-128-gcm"}"#, "1.2.3.4:8388")]
#[case::legacy_string_port("server: example.com\nserver_port: \"443\"", "example.com:443")]
#[case::legacy_ipv6("server: \"::1\"\nserver_port: 8080", "[::1]:8080")]
#[case::endpoint_string("$type: shadowsocks\nendpoint: example.com:443", "example.com:443")]
#[case::endpoint_address("endpoint:\n  $type: dial\n  address: 5.6.7.8:53", "5.6.7.8:53")]
#[case::endpoint_url("endpoint:\n  $type: websocket\n  url: wss://edge.example.com/tcp", "edge.example.com:443")]
#[case::nested_endpoint("endpoint:\n  $type: tls\n  endpoint: origin.example.com:8443", "origin.example.com:8443")]
#[case::ss_link_as_yaml_string("\"ss://Y2hhY2hhMjA@9.9.9.9:9\"", "9.9.9.9:9")]
fn shared_first_hop_is_derived(#[case] config: &str, #[case] expected: &str) {
    let (stream, packet) = hops(config);
    assert_eq!(stream, expected);
    assert_eq!(packet, expected);
}

#[test]
fn tcpudp_configures_each_path_separately() {
    let config = concat!(
        "$type: tcpudp\n",
        "tcp:\n",
        "  $type: shadowsocks\n",
        "  endpoint: tcp.example.com:443\n",
        "udp:\n",
        "  $type: shadowsocks\n",
        "  endpoint: udp.example.com:53\n",
    );
    assert_eq!(
        hops(config),
        ("tcp.example.com:443".to_owned(), "udp.example.com:53".to_owned())
    );
}

#[test]
fn tcpudp_accepts_ss_links_for_each_path() {
    let config = r#"{"$type":"tcpudp","tcp":"ss://a@1.1.1.1:1","udp":"ss://a@1.1.1.1:1"}"#;
    assert_eq!(hops(config), ("1.1.1.1:1".to_owned(), "1.1.1.1:1".to_owned()));
}

#[test]
fn surrounding_whitespace_is_ignored() {
    assert_eq!(hops("\n  ss://a@1.2.3.4:80 \n").0, "1.2.3.4:80");
}

#[rstest]
#[case::ss_link_without_port("ss://example-host-info", "URL has no port")]
#[case::sequence("[1, 2]", "unsupported transport config")]
#[case::plain_word("direct", "unsupported transport config")]
#[case::unknown_mapping("$type: mystery\noption: 1", "unsupported transport config")]
#[case::missing_server_port("server: 1.2.3.4", "missing 'server_port' in transport config")]
#[case::port_out_of_range("server: 1.2.3.4\nserver_port: 70000", "server_port must be a port number")]
#[case::empty_server("server: \"\"\nserver_port: 1", "server must be a non-empty string")]
#[case::endpoint_without_port("endpoint: example.com", "address 'example.com' has no port")]
#[case::endpoint_without_address("endpoint:\n  $type: dial", "endpoint has no address")]
#[case::tcpudp_without_udp("$type: tcpudp\ntcp: \"ss://a@1.1.1.1:1\"", "missing 'udp' in transport config")]
fn unusable_configs_are_invalid(#[case] config: &str, #[case] message: &str) {
    let error = failure(config);
    assert_eq!(error.code(), ErrorCode::InvalidConfig);
    assert_eq!(error.message(), message);
}

#[test]
fn malformed_yaml_reports_parse_failure() {
    let error = failure("{unclosed: [");
    assert_eq!(error.code(), ErrorCode::InvalidConfig);
    assert!(
        error.message().starts_with("failed to parse transport config: "),
        "unexpected message: {}",
        error.message()
    );
}
