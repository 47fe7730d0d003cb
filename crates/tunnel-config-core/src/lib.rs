//! Wire types and collaborator traits for the tunnel configuration pipeline.
//!
//! This crate defines the contract shared by the normalizer and the hosts
//! that embed it: the structured [`PlatformError`], the
//! [`InvokeMethodResult`] envelope returned to callers, the
//! [`TunnelConfigResponse`] success payload, and the traits through which the
//! pipeline reaches the transport-construction subsystem. It is re-exported
//! by the `tunnel-config` facade crate.
//!
//! # Core types
//!
//! - [`ErrorCode`] and [`PlatformError`]: stable, serializable failures
//! - [`InvokeMethodResult`]: exactly one of a value or an error
//! - [`TunnelConfigResponse`]: the `{firstHop, transport}` payload
//! - [`TransportFactory`] and [`TransportClient`]: the construction seam
//! - [`ConnectionProviderInfo`] and [`ClientMetadata`]: first-hop metadata
//!
//! # Example
//!
//! ```
//! use tunnel_config_core::{ErrorCode, InvokeMethodResult, PlatformError};
//!
//! let result = InvokeMethodResult::from(Err::<String, _>(PlatformError::new(
//!     ErrorCode::InvalidConfig,
//!     "failed to parse: unexpected end of input",
//! )));
//! assert_eq!(result.error().map(PlatformError::code), Some(ErrorCode::InvalidConfig));
//! ```

mod envelope;
mod error;
mod transport;

pub use envelope::{InvokeMethodResult, TunnelConfigResponse};
pub use error::{ErrorCode, PlatformError};
pub use transport::{ClientMetadata, ConnectionProviderInfo, TransportClient, TransportFactory};

#[cfg(test)]
mod tests;
