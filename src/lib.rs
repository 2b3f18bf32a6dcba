#![warn(missing_docs)]
//! Retouch - edit an image by describing the change in plain language.
//!
//! An image is loaded into a [`TransformController`], the user supplies a
//! prompt, and the controller forwards both to an [`ImageTransformer`]
//! (Gemini by default). The edited image comes back as a PNG data URI that
//! can be saved through a [`Downloader`].
//!
//! # Quick Start
//!
//! ```no_run
//! use retouch::{ClientConfig, FileDownloader, GeminiTransformer, SelectedFile, TransformController};
//!
//! #[tokio::main]
//! async fn main() -> retouch::Result<()> {
//!     let transformer = GeminiTransformer::builder()
//!         .config(ClientConfig::from_env()?)
//!         .build()?;
//!     let controller = TransformController::new(transformer);
//!
//!     controller.select_image(&SelectedFile::from_path("cat.png").await?).await;
//!     controller.edit_prompt("Add a tiny wizard hat");
//!     controller.submit_transform().await;
//!
//!     match controller.session().error {
//!         Some(message) => eprintln!("{message}"),
//!         None => {
//!             controller.download(&FileDownloader::new("."));
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `retouch` command-line front-end.

mod config;
mod controller;
pub mod data_uri;
mod download;
mod error;
pub mod image;
mod session;

// Re-export error types at crate root
pub use error::{sanitize_error_message, RetouchError, Result};

pub use config::{
    ClientConfig, API_KEY_ENV_VARS, BASE_URL_ENV_VAR, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
pub use controller::{user_message, validate_file, TransformController, MAX_FILE_SIZE};
pub use download::{Downloader, FileDownloader, DEFAULT_DOWNLOAD_NAME};
pub use image::providers::{GeminiTransformer, GeminiTransformerBuilder};
pub use image::{ImageFormat, ImageTransformer, SelectedFile, TransformRequest};
pub use session::TransformSession;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{RetouchError, Result};
    pub use crate::image::providers::GeminiTransformer;
    pub use crate::image::{ImageTransformer, SelectedFile, TransformRequest};
    pub use crate::{
        ClientConfig, Downloader, FileDownloader, TransformController, TransformSession,
    };
}
