//! Assembly of the success payload from a constructed client.

use tracing::debug;
use tunnel_config_core::{ErrorCode, PlatformError, TransportFactory, TunnelConfigResponse};

/// Picks the first hop to report for a client.
///
/// Returns the shared value when the stream and packet paths agree, and an
/// empty string otherwise.
///
/// # Example
///
/// ```
/// use tunnel_config::reconcile_first_hop;
///
/// assert_eq!(reconcile_first_hop("1.2.3.4:80", "1.2.3.4:80"), "1.2.3.4:80");
/// assert_eq!(reconcile_first_hop("1.2.3.4:80", "5.6.7.8:53"), "");
/// ```
#[must_use]
pub fn reconcile_first_hop<'a>(stream: &'a str, packet: &'a str) -> &'a str {
    if stream == packet { stream } else { "" }
}

/// Builds a client for `transport_config` and serializes the response JSON.
///
/// The `transport` field echoes `transport_config` exactly.
///
/// # Errors
///
/// Errors returned by `factory` are passed through unchanged. A failure to
/// serialize the response is reported as [`ErrorCode::InternalError`].
pub fn assemble_response<F>(factory: &F, transport_config: String) -> Result<String, PlatformError>
where
    F: TransportFactory + ?Sized,
{
    debug!(
        config_len = transport_config.len(),
        "constructing client from transport config"
    );
    let client = factory.new_client(&transport_config)?;

    let stream_hop = client.stream_info().first_hop();
    let packet_hop = client.packet_info().first_hop();
    let first_hop = reconcile_first_hop(stream_hop, packet_hop);
    if stream_hop != packet_hop {
        debug!(stream_hop, packet_hop, "stream and packet first hops differ");
    }

    let response = TunnelConfigResponse::new(transport_config, first_hop);
    serde_json::to_string(&response).map_err(|error| {
        PlatformError::new(
            ErrorCode::InternalError,
            format!("failed to serialize JSON response: {error}"),
        )
    })
}
