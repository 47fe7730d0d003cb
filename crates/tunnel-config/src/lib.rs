//! Tunnel configuration normalizer.
//!
//! Accepts a tunnel configuration in any of the three supported dialects,
//! resolves the transport config text, asks a [`TransportFactory`] to build a
//! client from it and returns an [`InvokeMethodResult`] envelope.
//!
//! # Dialects
//!
//! - **Legacy URL**: input starting with `ss://` is the transport config.
//! - **Legacy flat**: a YAML or JSON mapping without `transport` or `error`
//!   keys is the transport config, used verbatim.
//! - **Structured**: a mapping with a `transport` subtree and/or a provider
//!   `error` block. The subtree is re-serialized as YAML; an `error` block
//!   short-circuits into a provider error.
//!
//! # Example
//!
//! ```
//! use tunnel_config::{
//!     ClientMetadata, PlatformError, TransportClient, TransportFactory, parse_tunnel_config,
//! };
//!
//! struct FixedHop;
//!
//! impl TransportFactory for FixedHop {
//!     fn new_client(&self, _config: &str) -> Result<Box<dyn TransportClient>, PlatformError> {
//!         Ok(Box::new(ClientMetadata::shared("1.2.3.4:8080")))
//!     }
//! }
//!
//! let result = parse_tunnel_config("ss://example-host-info", &FixedHop);
//! assert_eq!(
//!     result.value(),
//!     Some(r#"{"firstHop":"1.2.3.4:8080","transport":"ss://example-host-info"}"#),
//! );
//! ```

mod dialect;
mod document;
mod node;
mod parser;
mod response;

pub use tunnel_config_core::{
    ClientMetadata, ConnectionProviderInfo, ErrorCode, InvokeMethodResult, PlatformError,
    TransportClient, TransportFactory, TunnelConfigResponse,
};

pub use dialect::{Dialect, detect_dialect};
pub use document::interpret_structured;
pub use parser::{ResolvedTransport, TunnelConfigParser, parse_tunnel_config, resolve_transport};
pub use response::{assemble_response, reconcile_first_hop};

#[cfg(test)]
mod tests;
