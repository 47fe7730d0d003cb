//! The seam between the normalizer and the transport-construction subsystem.
//!
//! The normalizer never builds transports itself. It hands the resolved
//! config text to a [`TransportFactory`] and reads back the first-hop
//! metadata of the resulting [`TransportClient`].

use crate::PlatformError;

/// Connection metadata reported for one transport path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionProviderInfo {
    /// Address of the first relay this path connects through.
    first_hop: String,
}

impl ConnectionProviderInfo {
    /// Creates metadata for a path whose first relay is `first_hop`.
    #[must_use]
    pub fn new(first_hop: impl Into<String>) -> Self {
        Self {
            first_hop: first_hop.into(),
        }
    }

    /// Returns the first-hop address.
    #[must_use]
    pub fn first_hop(&self) -> &str {
        &self.first_hop
    }
}

/// A constructed client exposing metadata for its stream and packet paths.
pub trait TransportClient {
    /// Metadata for the stream (TCP-like) path.
    fn stream_info(&self) -> &ConnectionProviderInfo;

    /// Metadata for the packet (UDP-like) path.
    fn packet_info(&self) -> &ConnectionProviderInfo;
}

/// Builds clients from normalized transport config text.
pub trait TransportFactory {
    /// Constructs a client for `transport_config`.
    ///
    /// # Errors
    ///
    /// Returns a [`PlatformError`] when the config cannot be turned into a
    /// working client. The error is passed to the caller unchanged.
    fn new_client(
        &self,
        transport_config: &str,
    ) -> Result<Box<dyn TransportClient>, PlatformError>;
}

/// A client described only by its per-path metadata.
///
/// Factories that resolve first hops without opening connections return
/// this type.
///
/// # Example
///
/// ```
/// use tunnel_config_core::{ClientMetadata, ConnectionProviderInfo, TransportClient};
///
/// let client = ClientMetadata::new(
///     ConnectionProviderInfo::new("example.com:443"),
///     ConnectionProviderInfo::new("example.com:53"),
/// );
/// assert_eq!(client.stream_info().first_hop(), "example.com:443");
/// assert_eq!(client.packet_info().first_hop(), "example.com:53");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMetadata {
    stream: ConnectionProviderInfo,
    packet: ConnectionProviderInfo,
}

impl ClientMetadata {
    /// Creates a client from stream and packet metadata.
    #[must_use]
    pub const fn new(stream: ConnectionProviderInfo, packet: ConnectionProviderInfo) -> Self {
        Self { stream, packet }
    }

    /// Creates a client whose stream and packet paths share `first_hop`.
    #[must_use]
    pub fn shared(first_hop: impl Into<String>) -> Self {
        let info = ConnectionProviderInfo::new(first_hop);
        Self {
            stream: info.clone(),
            packet: info,
        }
    }
}

impl TransportClient for ClientMetadata {
    fn stream_info(&self) -> &ConnectionProviderInfo {
        &self.stream
    }

    fn packet_info(&self) -> &ConnectionProviderInfo {
        &self.packet
    }
}
