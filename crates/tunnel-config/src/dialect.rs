//! Dialect detection for raw tunnel configuration text.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::IgnoredAny;
use tunnel_config_core::{ErrorCode, PlatformError};

const LEGACY_URL_PREFIX: &str = "ss://";
const TRANSPORT_KEY: &str = "transport";
const ERROR_KEY: &str = "error";

/// The textual encodings a tunnel configuration may arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// An `ss://` link; the whole input is the transport config.
    LegacyUrl,
    /// A flat mapping with no `transport` or `error` key.
    LegacyFlat,
    /// A mapping with a `transport` subtree and/or an `error` block.
    Structured,
}

impl Dialect {
    /// Returns a stable lowercase name, used in log events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LegacyUrl => "legacy_url",
            Self::LegacyFlat => "legacy_flat",
            Self::Structured => "structured",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies already-trimmed input.
///
/// Non-URL input is parsed once as YAML, which also accepts JSON, only to
/// look at its top-level keys. The parsed document is discarded.
///
/// # Errors
///
/// Returns an [`ErrorCode::InvalidConfig`] error when the input is neither an
/// `ss://` link nor a YAML mapping.
///
/// # Example
///
/// ```
/// use tunnel_config::{Dialect, detect_dialect};
///
/// assert_eq!(detect_dialect("ss://host").ok(), Some(Dialect::LegacyUrl));
/// assert_eq!(detect_dialect(r#"{"server":"x"}"#).ok(), Some(Dialect::LegacyFlat));
/// assert_eq!(detect_dialect("transport: {}").ok(), Some(Dialect::Structured));
/// ```
pub fn detect_dialect(input: &str) -> Result<Dialect, PlatformError> {
    if input.starts_with(LEGACY_URL_PREFIX) {
        return Ok(Dialect::LegacyUrl);
    }

    let top_level: BTreeMap<String, IgnoredAny> = serde_saphyr::from_str(input).map_err(parse_error)?;
    if top_level.contains_key(TRANSPORT_KEY) || top_level.contains_key(ERROR_KEY) {
        Ok(Dialect::Structured)
    } else {
        Ok(Dialect::LegacyFlat)
    }
}

/// Wraps a parser failure as an `InvalidConfig` platform error.
pub(crate) fn parse_error(error: impl fmt::Display) -> PlatformError {
    PlatformError::new(ErrorCode::InvalidConfig, format!("failed to parse: {error}"))
}
