//! Interpretation of structured tunnel config documents.
//!
//! A structured document carries the transport config as a subtree under
//! `transport`, or a failure reported by the config provider under `error`.
//! The subtree is kept as a YAML node tree and written back out as YAML so
//! the transport factory always receives text.

use std::fmt;

use serde::Deserialize;
use tracing::warn;
use tunnel_config_core::{ErrorCode, PlatformError};

use crate::dialect::parse_error;
use crate::node::{YamlNode, parse_document};

const TRANSPORT_KEY: &str = "transport";
const DETAILS_KEY: &str = "details";

/// Typed projection of a structured document.
///
/// `transport` is left to [`parse_document`] so its scalars are never
/// reinterpreted.
#[derive(Debug, Deserialize)]
struct TunnelConfigRequest {
    error: Option<ProviderErrorBlock>,
}

/// The `error` block written by a config provider.
#[derive(Debug, Deserialize)]
struct ProviderErrorBlock {
    message: String,
    details: Option<String>,
}

impl From<ProviderErrorBlock> for PlatformError {
    fn from(block: ProviderErrorBlock) -> Self {
        let mut error = Self::new(ErrorCode::ProviderError, block.message);
        if let Some(details) = block.details.filter(|details| !details.is_empty()) {
            error = error.with_detail(DETAILS_KEY, details);
        }
        error
    }
}

/// Resolves the transport config text of a structured document.
///
/// An `error` block takes precedence over `transport`: when present the
/// provider's message is returned as an [`ErrorCode::ProviderError`] and the
/// transport subtree is ignored.
///
/// # Errors
///
/// Returns [`ErrorCode::InvalidConfig`] when the document does not match the
/// expected shape or the transport subtree cannot be rebuilt (an alias with
/// no anchor, or alias expansion past the node limit), and
/// [`ErrorCode::ProviderError`] when the document carries an `error` block.
///
/// # Example
///
/// ```
/// use tunnel_config::{ErrorCode, interpret_structured};
///
/// let error = interpret_structured("error:\n  message: quota exceeded")
///     .expect_err("provider error");
/// assert_eq!(error.code(), ErrorCode::ProviderError);
/// assert_eq!(error.message(), "quota exceeded");
/// ```
pub fn interpret_structured(input: &str) -> Result<String, PlatformError> {
    let request: TunnelConfigRequest = serde_saphyr::from_str(input).map_err(parse_error)?;

    if let Some(block) = request.error {
        let error = PlatformError::from(block);
        warn!(
            code = %error.code(),
            has_details = error.details().is_some(),
            "tunnel config carries a provider error"
        );
        return Err(error);
    }

    let transport = parse_document(input)
        .map_err(normalize_error)?
        .and_then(|root| root.into_entry(TRANSPORT_KEY))
        .unwrap_or_else(YamlNode::null);
    Ok(transport.to_yaml())
}

fn normalize_error(error: impl fmt::Display) -> PlatformError {
    PlatformError::new(
        ErrorCode::InvalidConfig,
        format!("failed to normalize config: {error}"),
    )
}
