//! Image transformer trait.

use crate::error::Result;
use crate::image::types::TransformRequest;
use async_trait::async_trait;

/// A service that edits an image according to a text instruction.
///
/// Implementations return the edited image as a data URI, or one of
/// [`EmptyResponse`](crate::RetouchError::EmptyResponse),
/// [`ModelRefusal`](crate::RetouchError::ModelRefusal),
/// [`NoImageProduced`](crate::RetouchError::NoImageProduced) or
/// [`GenerationFailed`](crate::RetouchError::GenerationFailed).
#[async_trait]
pub trait ImageTransformer: Send + Sync {
    /// Sends one transform request. No retries.
    async fn transform(&self, request: &TransformRequest) -> Result<String>;

    /// Returns the name of this transformer for display.
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: ImageTransformer + ?Sized> ImageTransformer for std::sync::Arc<T> {
    async fn transform(&self, request: &TransformRequest) -> Result<String> {
        (**self).transform(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
