//! Unit and behavioural tests for the tunnel config pipeline.

mod response_tests;

use mockall::mock;
use tunnel_config_core::{ClientMetadata, PlatformError, TransportClient, TransportFactory};

mock! {
    Factory {}
    impl TransportFactory for Factory {
        fn new_client(
            &self,
            transport_config: &str,
        ) -> Result<Box<dyn TransportClient>, PlatformError>;
    }
}

/// Builds a `MockFactory` expecting one call with exactly `expected` and
/// returning `client`.
fn factory_expecting(expected: &str, client: ClientMetadata) -> MockFactory {
    let expected_text = expected.to_owned();
    let mut factory = MockFactory::new();
    factory
        .expect_new_client()
        .once()
        .returning(move |transport_config: &str| {
            assert_eq!(transport_config, expected_text, "unexpected transport config text");
            let boxed: Box<dyn TransportClient> = Box::new(client.clone());
            Ok(boxed)
        });
    factory
}

/// Builds a `MockFactory` expecting one call and failing with `error`.
fn factory_failing(error: PlatformError) -> MockFactory {
    let mut factory = MockFactory::new();
    factory
        .expect_new_client()
        .once()
        .return_once(move |_transport_config| Err(error));
    factory
}

/// Builds a `MockFactory` where construction is never expected.
fn factory_unused() -> MockFactory {
    MockFactory::new()
}

/// Parses YAML text into a generic value tree for structural comparison.
fn yaml_value(text: &str) -> serde_json::Value {
    serde_saphyr::from_str(text).expect("text should be valid YAML")
}
