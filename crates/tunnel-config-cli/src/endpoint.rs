//! A transport factory that derives first hops from the config text alone.
//!
//! No sockets are opened and no names are resolved: the first hop of each
//! path is the endpoint address written in the config. Supported shapes are
//! `ss://` links, legacy Shadowsocks mappings (`server` plus `server_port`),
//! mappings with an `endpoint`, and `$type: tcpudp` mappings that configure
//! the stream and packet paths separately.

use serde_json::{Map, Value};
use tracing::debug;
use tunnel_config::{
    ClientMetadata, ErrorCode, PlatformError, TransportClient, TransportFactory,
};
use url::Url;

const SS_SCHEME_PREFIX: &str = "ss://";
const TYPE_KEY: &str = "$type";
const TCPUDP_TYPE: &str = "tcpudp";
const TCP_KEY: &str = "tcp";
const UDP_KEY: &str = "udp";
const ENDPOINT_KEY: &str = "endpoint";
const ADDRESS_KEY: &str = "address";
const URL_KEY: &str = "url";
const SERVER_KEY: &str = "server";
const SERVER_PORT_KEY: &str = "server_port";

/// Builds [`ClientMetadata`] clients from the endpoints named in a config.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointFactory;

impl TransportFactory for EndpointFactory {
    fn new_client(
        &self,
        transport_config: &str,
    ) -> Result<Box<dyn TransportClient>, PlatformError> {
        let client = resolve_text(transport_config.trim())?;
        debug!(
            stream_hop = client.stream_info().first_hop(),
            packet_hop = client.packet_info().first_hop(),
            "resolved transport endpoints"
        );
        Ok(Box::new(client))
    }
}

fn resolve_text(text: &str) -> Result<ClientMetadata, PlatformError> {
    if text.starts_with(SS_SCHEME_PREFIX) {
        return url_hop(text).map(ClientMetadata::shared);
    }

    let value: Value = serde_saphyr::from_str(text).map_err(|error| {
        invalid_config(format!("failed to parse transport config: {error}"))
    })?;
    resolve_value(&value)
}

fn resolve_value(value: &Value) -> Result<ClientMetadata, PlatformError> {
    match value {
        Value::String(text) if text.trim().starts_with(SS_SCHEME_PREFIX) => {
            url_hop(text.trim()).map(ClientMetadata::shared)
        }
        Value::Object(map) => resolve_mapping(map),
        _ => Err(unsupported()),
    }
}

fn resolve_mapping(map: &Map<String, Value>) -> Result<ClientMetadata, PlatformError> {
    if map.get(TYPE_KEY).and_then(Value::as_str) == Some(TCPUDP_TYPE) {
        let stream = resolve_value(required(map, TCP_KEY)?)?;
        let packet = resolve_value(required(map, UDP_KEY)?)?;
        return Ok(ClientMetadata::new(
            stream.stream_info().clone(),
            packet.packet_info().clone(),
        ));
    }

    if let Some(endpoint) = map.get(ENDPOINT_KEY) {
        return endpoint_hop(endpoint).map(ClientMetadata::shared);
    }

    if let Some(server) = map.get(SERVER_KEY) {
        return legacy_hop(server, required(map, SERVER_PORT_KEY)?).map(ClientMetadata::shared);
    }

    Err(unsupported())
}

fn endpoint_hop(endpoint: &Value) -> Result<String, PlatformError> {
    match endpoint {
        Value::String(address) => host_port(address),
        Value::Object(map) => {
            if let Some(address) = map.get(ADDRESS_KEY).and_then(Value::as_str) {
                return host_port(address);
            }
            if let Some(url) = map.get(URL_KEY).and_then(Value::as_str) {
                return url_hop(url);
            }
            map.get(ENDPOINT_KEY).map_or_else(
                || Err(invalid_config("endpoint has no address")),
                endpoint_hop,
            )
        }
        _ => Err(invalid_config("endpoint must be a string or a mapping")),
    }
}

fn legacy_hop(server: &Value, port: &Value) -> Result<String, PlatformError> {
    let host = server
        .as_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| invalid_config("server must be a non-empty string"))?;
    let port_number = match port {
        Value::Number(number) => number.as_u64().and_then(|raw| u16::try_from(raw).ok()),
        Value::String(text) => text.parse::<u16>().ok(),
        _ => None,
    }
    .ok_or_else(|| invalid_config("server_port must be a port number"))?;

    if host.contains(':') {
        Ok(format!("[{host}]:{port_number}"))
    } else {
        Ok(format!("{host}:{port_number}"))
    }
}

fn url_hop(text: &str) -> Result<String, PlatformError> {
    let url = Url::parse(text).map_err(|error| invalid_config(format!("invalid URL: {error}")))?;
    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| invalid_config("URL has no host"))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| invalid_config("URL has no port"))?;
    Ok(format!("{host}:{port}"))
}

fn host_port(address: &str) -> Result<String, PlatformError> {
    let (host, port) = address
        .rsplit_once(':')
        .ok_or_else(|| invalid_config(format!("address '{address}' has no port")))?;
    if host.is_empty() {
        return Err(invalid_config(format!("address '{address}' has no host")));
    }
    port.parse::<u16>()
        .map_err(|error| invalid_config(format!("address '{address}' has an invalid port: {error}")))?;
    Ok(address.to_owned())
}

fn required<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a Value, PlatformError> {
    map.get(key)
        .ok_or_else(|| invalid_config(format!("missing '{key}' in transport config")))
}

fn unsupported() -> PlatformError {
    invalid_config("unsupported transport config")
}

fn invalid_config(message: impl Into<String>) -> PlatformError {
    PlatformError::new(ErrorCode::InvalidConfig, message)
}
