//! Structured platform errors.
//!
//! Every failure the pipeline reports, whether detected locally, embedded by
//! a configuration provider, or raised by the transport factory, is surfaced
//! as a [`PlatformError`]. The serialized shape is a fixed wire contract
//! shared with the hosts that display these errors.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable error codes carried by a [`PlatformError`].
///
/// The serialized form of each variant is its `ERR_*` wire string, which is
/// also what `Display` prints.
///
/// # Example
///
/// ```
/// use tunnel_config_core::ErrorCode;
///
/// assert_eq!(ErrorCode::InvalidConfig.to_string(), "ERR_INVALID_CONFIG");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorCode {
    /// A failure inside the normalizer itself, after input validation.
    #[serde(rename = "ERR_INTERNAL_ERROR")]
    InternalError,
    /// The configuration provider reported a failure inside the document.
    #[serde(rename = "ERR_PROVIDER")]
    ProviderError,
    /// The configuration text could not be parsed or normalized.
    #[serde(rename = "ERR_INVALID_CONFIG")]
    InvalidConfig,
    /// The configuration parsed but describes something unsupported.
    #[serde(rename = "ERR_ILLEGAL_CONFIG")]
    IllegalConfig,
    /// Fetching a dynamic configuration failed.
    #[serde(rename = "ERR_FETCH_CONFIG_FAILURE")]
    FetchConfigFailed,
    /// The proxy server could not be reached.
    #[serde(rename = "ERR_PROXY_SERVER_UNREACHABLE")]
    ProxyServerUnreachable,
    /// The proxy server rejected the client credentials.
    #[serde(rename = "ERR_CLIENT_UNAUTHENTICATED")]
    Unauthenticated,
    /// The proxy server does not relay UDP traffic.
    #[serde(rename = "ERR_PROXY_SERVER_UDP_NOT_SUPPORTED")]
    ProxyServerUdpUnsupported,
}

impl ErrorCode {
    /// Returns the wire string for this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InternalError => "ERR_INTERNAL_ERROR",
            Self::ProviderError => "ERR_PROVIDER",
            Self::InvalidConfig => "ERR_INVALID_CONFIG",
            Self::IllegalConfig => "ERR_ILLEGAL_CONFIG",
            Self::FetchConfigFailed => "ERR_FETCH_CONFIG_FAILURE",
            Self::ProxyServerUnreachable => "ERR_PROXY_SERVER_UNREACHABLE",
            Self::Unauthenticated => "ERR_CLIENT_UNAUTHENTICATED",
            Self::ProxyServerUdpUnsupported => "ERR_PROXY_SERVER_UDP_NOT_SUPPORTED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured failure returned across the platform boundary.
///
/// Carries a stable [`ErrorCode`], a human-readable message, an optional
/// free-form `details` mapping and an optional nested cause.
///
/// # Example
///
/// ```
/// use tunnel_config_core::{ErrorCode, PlatformError};
///
/// let error = PlatformError::new(ErrorCode::ProviderError, "quota exceeded")
///     .with_detail("details", "daily limit");
/// assert_eq!(error.message(), "quota exceeded");
/// assert_eq!(error.to_string(), "ERR_PROVIDER: quota exceeded");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct PlatformError {
    code: ErrorCode,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[source]
    cause: Option<Box<PlatformError>>,
}

impl PlatformError {
    /// Creates an error without details or cause.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            cause: None,
        }
    }

    /// Adds one entry to the details mapping, creating it if needed.
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replaces the details mapping.
    #[must_use]
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }

    /// Attaches the error that caused this one.
    #[must_use]
    pub fn with_cause(mut self, cause: Self) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Returns the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the details mapping, if any.
    #[must_use]
    pub const fn details(&self) -> Option<&Map<String, Value>> {
        self.details.as_ref()
    }

    /// Returns the nested cause, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Self> {
        self.cause.as_deref()
    }
}
