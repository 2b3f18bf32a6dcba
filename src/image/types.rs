//! Core types for image transformation.

use crate::data_uri::DecodedDataUri;
use std::path::{Path, PathBuf};

/// Media type declared for files whose extension is not a known image type.
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Image formats recognised when declaring a file's media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG format (lossless).
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
    /// GIF format.
    Gif,
}

impl ImageFormat {
    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Gif => "image/gif",
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Attempts to detect format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Where the content of a [`SelectedFile`] lives.
#[derive(Debug, Clone)]
enum FileSource {
    Path(PathBuf),
    Memory(Vec<u8>),
}

/// A file picked by the user, described by its declared media type and size.
///
/// Content is only read once the file has passed validation.
#[derive(Debug, Clone)]
pub struct SelectedFile {
    name: String,
    media_type: String,
    size: u64,
    source: FileSource,
}

impl SelectedFile {
    /// Describes a file on disk, declaring its media type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        let media_type = ImageFormat::from_path(path)
            .map(|f| f.mime_type())
            .unwrap_or(UNKNOWN_MEDIA_TYPE);

        Ok(Self {
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            media_type: media_type.to_string(),
            size: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Describes an in-memory file with an explicit media type.
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            size: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        }
    }

    /// File name, without directories.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared media type.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Declared size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Reads the file content.
    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        match &self.source {
            FileSource::Path(path) => tokio::fs::read(path).await,
            FileSource::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

/// A request to transform an image with a text instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRequest {
    /// Base64-encoded source image.
    pub image_base64: String,
    /// Media type of the source image.
    pub mime_type: String,
    /// The user's instruction, as typed.
    pub prompt: String,
}

impl TransformRequest {
    /// Creates a new request.
    pub fn new(
        image_base64: impl Into<String>,
        mime_type: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Self {
        Self {
            image_base64: image_base64.into(),
            mime_type: mime_type.into(),
            prompt: prompt.into(),
        }
    }

    /// Builds a request from a decoded data URI, forwarding the payload as-is.
    pub fn from_data_uri(image: DecodedDataUri, prompt: impl Into<String>) -> Self {
        Self::new(image.payload, image.media_type, prompt)
    }
}
