//! The result envelope and the success payload of a tunnel config parse.

use serde::{Deserialize, Serialize};

use crate::PlatformError;

/// Outer envelope returned to the host: exactly one of a value or an error.
///
/// Serializes as `{"value": "..."}` or `{"error": {...}}`.
///
/// # Example
///
/// ```
/// use tunnel_config_core::InvokeMethodResult;
///
/// let result = InvokeMethodResult::Value(String::from("{}"));
/// assert_eq!(result.value(), Some("{}"));
/// assert!(result.error().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvokeMethodResult {
    /// The serialized success payload.
    Value(String),
    /// The failure that ended the invocation.
    Error(PlatformError),
}

impl InvokeMethodResult {
    /// Returns the success payload, if any.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value),
            Self::Error(_) => None,
        }
    }

    /// Returns the error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&PlatformError> {
        match self {
            Self::Value(_) => None,
            Self::Error(error) => Some(error),
        }
    }

    /// Returns `true` when the envelope carries an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Converts the envelope back into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the carried [`PlatformError`] for error envelopes.
    pub fn into_result(self) -> Result<String, PlatformError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Error(error) => Err(error),
        }
    }
}

impl From<Result<String, PlatformError>> for InvokeMethodResult {
    fn from(result: Result<String, PlatformError>) -> Self {
        match result {
            Ok(value) => Self::Value(value),
            Err(error) => Self::Error(error),
        }
    }
}

/// Success payload describing a validated tunnel configuration.
///
/// `first_hop` is empty unless the stream and packet paths share the same
/// first hop.
///
/// # Example
///
/// ```
/// use tunnel_config_core::TunnelConfigResponse;
///
/// let response = TunnelConfigResponse::new("ss://host", "1.2.3.4:8080");
/// let json = serde_json::to_string(&response).expect("serialize");
/// assert_eq!(json, r#"{"firstHop":"1.2.3.4:8080","transport":"ss://host"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TunnelConfigResponse {
    first_hop: String,
    transport: String,
}

impl TunnelConfigResponse {
    /// Creates a response for `transport` with the given first hop.
    #[must_use]
    pub fn new(transport: impl Into<String>, first_hop: impl Into<String>) -> Self {
        Self {
            first_hop: first_hop.into(),
            transport: transport.into(),
        }
    }

    /// Returns the shared first hop, or an empty string.
    #[must_use]
    pub fn first_hop(&self) -> &str {
        &self.first_hop
    }

    /// Returns the transport config text that was validated.
    #[must_use]
    pub fn transport(&self) -> &str {
        &self.transport
    }
}
