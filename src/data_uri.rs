//! Conversions between binary content and `data:` URIs.

use crate::error::{RetouchError, Result};
use base64::Engine;
use regex::Regex;
use std::sync::LazyLock;

static DATA_URI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:([a-zA-Z0-9]+/[a-zA-Z0-9.+-]+);base64,(.+)$")
        .expect("data URI pattern is valid")
});

/// A data URI split into its media type and base64 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUri {
    /// Media type, e.g. `image/png`.
    pub media_type: String,
    /// Base64 payload, not validated.
    pub payload: String,
}

impl DecodedDataUri {
    /// Decodes the base64 payload into raw bytes.
    ///
    /// This is where a malformed payload first surfaces.
    pub fn bytes(&self) -> Result<Vec<u8>> {
        base64::engine::general_purpose::STANDARD
            .decode(&self.payload)
            .map_err(|e| RetouchError::MalformedInput(format!("invalid base64 payload: {e}")))
    }
}

/// Encodes bytes as `data:<media_type>;base64,<payload>`.
pub fn encode(bytes: &[u8], media_type: &str) -> String {
    format!(
        "data:{};base64,{}",
        media_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Splits a data URI into media type and base64 payload.
///
/// Only the shape is checked; the payload must be non-empty but its
/// alphabet is not validated.
pub fn decode(data_uri: &str) -> Result<DecodedDataUri> {
    let captures = DATA_URI_PATTERN
        .captures(data_uri)
        .ok_or_else(|| RetouchError::MalformedInput("invalid data URI".into()))?;

    Ok(DecodedDataUri {
        media_type: captures[1].to_string(),
        payload: captures[2].to_string(),
    })
}
