//! State of one image transformation workflow.

/// Everything the view needs to render one workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformSession {
    /// Source image as a data URI.
    pub original_image: Option<String>,
    /// Result of the last successful transform, as a PNG data URI.
    pub transformed_image: Option<String>,
    /// The user's instruction.
    pub prompt: String,
    /// True while a transform request is outstanding.
    pub is_busy: bool,
    /// Message describing the last failure.
    pub error: Option<String>,
}

impl TransformSession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session holding a freshly selected image.
    pub fn with_original(data_uri: String) -> Self {
        Self {
            original_image: Some(data_uri),
            ..Self::default()
        }
    }

    /// Returns true if a transform could be submitted right now.
    pub fn can_submit(&self) -> bool {
        !self.is_busy && self.original_image.is_some() && !self.prompt.trim().is_empty()
    }

    /// Records a failure. Always leaves the session idle.
    pub(crate) fn fail(&mut self, message: String) {
        self.is_busy = false;
        self.error = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let session = TransformSession::new();
        assert!(session.original_image.is_none());
        assert!(session.transformed_image.is_none());
        assert!(session.prompt.is_empty());
        assert!(!session.is_busy);
        assert!(session.error.is_none());
    }

    #[test]
    fn test_can_submit() {
        let mut session = TransformSession::with_original("data:image/png;base64,AAAA".into());
        assert!(!session.can_submit());

        session.prompt = "   ".into();
        assert!(!session.can_submit());

        session.prompt = "add a hat".into();
        assert!(session.can_submit());

        session.is_busy = true;
        assert!(!session.can_submit());
    }

    #[test]
    fn test_fail_clears_busy() {
        let mut session = TransformSession::new();
        session.is_busy = true;
        session.fail("boom".into());
        assert!(!session.is_busy);
        assert_eq!(session.error.as_deref(), Some("boom"));
    }
}
