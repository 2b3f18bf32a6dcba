//! Image transformation module.

mod provider;
pub mod providers;
mod types;

pub use provider::ImageTransformer;
pub use types::{ImageFormat, SelectedFile, TransformRequest, UNKNOWN_MEDIA_TYPE};
