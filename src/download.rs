//! Saving transformed images.

use crate::data_uri;
use std::path::{Path, PathBuf};

/// File name offered when saving a transformed image.
pub const DEFAULT_DOWNLOAD_NAME: &str = "transformed-image.png";

/// Hands a data URI to the host environment to be saved.
///
/// Fire-and-forget: implementations report failures through logging only.
pub trait Downloader: Send + Sync {
    /// Saves the content of `data_uri` under `filename`.
    fn trigger(&self, data_uri: &str, filename: &str);
}

/// Writes downloads into a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileDownloader {
    dir: PathBuf,
}

impl FileDownloader {
    /// Creates a downloader writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn save(&self, data_uri: &str, filename: &str) -> crate::Result<PathBuf> {
        let bytes = data_uri::decode(data_uri)?.bytes()?;
        // Only the final component of the suggested name is honoured.
        let name = Path::new(filename)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_DOWNLOAD_NAME.into());
        let path = self.dir.join(name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

impl Downloader for FileDownloader {
    fn trigger(&self, data_uri: &str, filename: &str) {
        match self.save(data_uri, filename) {
            Ok(path) => tracing::debug!(path = %path.display(), "saved download"),
            Err(e) => tracing::warn!(filename, "failed to save download: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = FileDownloader::new(dir.path());

        downloader.trigger(
            &data_uri::encode(b"\x89PNG pixels", "image/png"),
            DEFAULT_DOWNLOAD_NAME,
        );

        let written = std::fs::read(dir.path().join("transformed-image.png")).unwrap();
        assert_eq!(written, b"\x89PNG pixels");
    }

    #[test]
    fn test_trigger_strips_directories_from_name() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = FileDownloader::new(dir.path());

        downloader.trigger("data:image/png;base64,aGk=", "../../escape.png");

        assert!(dir.path().join("escape.png").exists());
    }

    #[test]
    fn test_trigger_swallows_failures() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = FileDownloader::new(dir.path().join("missing"));

        downloader.trigger("not a data uri", "out.png");
        downloader.trigger("data:image/png;base64,aGk=", "out.png");

        assert!(!dir.path().join("missing").exists());
    }
}
