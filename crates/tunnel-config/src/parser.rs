//! Entry points tying dialect detection, document interpretation and
//! response assembly together.
//!
//! [`resolve_transport`] stops after the transport config text is known;
//! [`parse_tunnel_config`] and [`TunnelConfigParser::parse`] run the whole
//! pipeline and always return an [`InvokeMethodResult`].

use tracing::debug;
use tunnel_config_core::{InvokeMethodResult, PlatformError, TransportFactory};

use crate::dialect::{Dialect, detect_dialect};
use crate::document::interpret_structured;
use crate::response::assemble_response;

/// The transport config text resolved from raw input, with its dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTransport {
    dialect: Dialect,
    transport_config: String,
}

impl ResolvedTransport {
    /// Returns the dialect the input was classified as.
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Returns the transport config text.
    #[must_use]
    pub fn transport_config(&self) -> &str {
        &self.transport_config
    }

    /// Consumes the resolution, returning the transport config text.
    #[must_use]
    pub fn into_transport_config(self) -> String {
        self.transport_config
    }
}

/// Trims `input`, detects its dialect and resolves the transport config.
///
/// Legacy inputs resolve to the trimmed text itself. Structured inputs
/// resolve to the re-serialized `transport` subtree.
///
/// # Errors
///
/// Returns [`crate::ErrorCode::InvalidConfig`] for malformed input and
/// [`crate::ErrorCode::ProviderError`] for documents carrying an `error`
/// block.
///
/// # Example
///
/// ```
/// use tunnel_config::{Dialect, resolve_transport};
///
/// let resolved = resolve_transport("  ss://example-host-info\n").expect("resolves");
/// assert_eq!(resolved.dialect(), Dialect::LegacyUrl);
/// assert_eq!(resolved.transport_config(), "ss://example-host-info");
/// ```
pub fn resolve_transport(input: &str) -> Result<ResolvedTransport, PlatformError> {
    let trimmed = input.trim();
    let dialect = detect_dialect(trimmed)?;
    debug!(%dialect, input_len = trimmed.len(), "classified tunnel config");

    let transport_config = match dialect {
        Dialect::LegacyUrl | Dialect::LegacyFlat => trimmed.to_owned(),
        Dialect::Structured => interpret_structured(trimmed)?,
    };

    Ok(ResolvedTransport {
        dialect,
        transport_config,
    })
}

/// Runs the full pipeline for one input against `factory`.
///
/// The first failure ends the invocation and is returned as the error
/// envelope.
pub fn parse_tunnel_config<F>(input: &str, factory: &F) -> InvokeMethodResult
where
    F: TransportFactory + ?Sized,
{
    resolve_transport(input)
        .and_then(|resolved| assemble_response(factory, resolved.into_transport_config()))
        .into()
}

/// A reusable parser bound to one transport factory.
///
/// # Example
///
/// ```
/// use tunnel_config::{
///     ErrorCode, PlatformError, TransportClient, TransportFactory, TunnelConfigParser,
/// };
///
/// struct Offline;
///
/// impl TransportFactory for Offline {
///     fn new_client(&self, _config: &str) -> Result<Box<dyn TransportClient>, PlatformError> {
///         Err(PlatformError::new(ErrorCode::ProxyServerUnreachable, "offline"))
///     }
/// }
///
/// let parser = TunnelConfigParser::new(Offline);
/// let result = parser.parse("ss://example-host-info");
/// assert_eq!(
///     result.error().map(PlatformError::code),
///     Some(ErrorCode::ProxyServerUnreachable),
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct TunnelConfigParser<F> {
    factory: F,
}

impl<F: TransportFactory> TunnelConfigParser<F> {
    /// Creates a parser that builds clients with `factory`.
    #[must_use]
    pub const fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Returns the transport factory.
    #[must_use]
    pub const fn factory(&self) -> &F {
        &self.factory
    }

    /// Resolves the transport config text without constructing a client.
    ///
    /// # Errors
    ///
    /// See [`resolve_transport`].
    pub fn resolve(&self, input: &str) -> Result<ResolvedTransport, PlatformError> {
        resolve_transport(input)
    }

    /// Parses one tunnel config and returns the result envelope.
    pub fn parse(&self, input: &str) -> InvokeMethodResult {
        parse_tunnel_config(input, &self.factory)
    }
}
