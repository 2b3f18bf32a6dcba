//! Error types for image transformation.

/// Errors that can occur while selecting, encoding or transforming an image.
#[derive(Debug, thiserror::Error)]
pub enum RetouchError {
    /// File is not an image or exceeds the size limit.
    #[error("invalid file: {0}")]
    InvalidFile(String),

    /// A data URI could not be parsed.
    #[error("malformed data URI: {0}")]
    MalformedInput(String),

    /// The service answered without any candidate.
    #[error("no response received from the model")]
    EmptyResponse,

    /// The service declined to produce an image and explained why.
    #[error("model refused to transform the image: {0}")]
    ModelRefusal(String),

    /// The service answered with neither an image nor text.
    #[error("no image found in the model response")]
    NoImageProduced,

    /// Transport or service fault (network, non-success status, bad payload).
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// Missing or unusable configuration (e.g. API key).
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error (e.g. reading an input file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for RetouchError {
    fn from(err: reqwest::Error) -> Self {
        Self::GenerationFailed(sanitize_error_message(&err.to_string()))
    }
}

impl From<serde_json::Error> for RetouchError {
    fn from(err: serde_json::Error) -> Self {
        Self::GenerationFailed(format!("unreadable service response: {err}"))
    }
}

/// Maximum length of a service error message carried in an error.
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Cleans up a service error message before it is surfaced to a user.
///
/// Collapses whitespace, redacts anything that looks like a Google API key
/// (`AIza...`) and truncates overly long bodies on a char boundary.
pub fn sanitize_error_message(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let redacted = collapsed
        .split(' ')
        .map(|word| {
            if let Some(pos) = word.find("AIza") {
                format!("{}[REDACTED]", &word[..pos])
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    if redacted.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return redacted;
    }
    let truncated: String = redacted.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    format!("{truncated}...")
}

/// Result type alias for image transformation operations.
pub type Result<T> = std::result::Result<T, RetouchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RetouchError::ModelRefusal("I cannot edit this image".into());
        assert_eq!(
            err.to_string(),
            "model refused to transform the image: I cannot edit this image"
        );

        let err = RetouchError::GenerationFailed("HTTP 500".into());
        assert_eq!(err.to_string(), "generation failed: HTTP 500");
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        assert_eq!(
            sanitize_error_message("  bad\n\n request \t here "),
            "bad request here"
        );
    }

    #[test]
    fn test_sanitize_redacts_api_key() {
        let msg = sanitize_error_message("invalid key=AIzaSyExample123 supplied");
        assert_eq!(msg, "invalid key=[REDACTED] supplied");
    }

    #[test]
    fn test_sanitize_truncates_long_messages() {
        let long = "x".repeat(MAX_ERROR_MESSAGE_LEN + 50);
        let msg = sanitize_error_message(&long);
        assert_eq!(msg.len(), MAX_ERROR_MESSAGE_LEN + 3);
        assert!(msg.ends_with("..."));
    }
}
