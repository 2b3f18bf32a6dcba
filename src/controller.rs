//! Transform controller: sequences user actions over a [`TransformSession`].
//!
//! The controller is a cheap, cloneable handle. Each transform runs as its
//! own tokio task tagged with a generation number; [`reset`] and
//! [`select_image`] abort the task and bump the generation so a late
//! completion can never overwrite a newer session.
//!
//! [`reset`]: TransformController::reset
//! [`select_image`]: TransformController::select_image

use crate::data_uri;
use crate::download::{Downloader, DEFAULT_DOWNLOAD_NAME};
use crate::error::{RetouchError, Result};
use crate::image::{ImageTransformer, SelectedFile, TransformRequest};
use crate::session::TransformSession;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::AbortHandle;

/// Largest accepted input file, in bytes.
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

const NOT_AN_IMAGE: &str = "Please choose a valid image file (JPG, PNG, WebP).";
const FILE_TOO_LARGE: &str = "The image is too large. Please choose an image smaller than 5 MB.";
const NO_IMAGE_SELECTED: &str = "Please select an image first.";
const EMPTY_PROMPT: &str = "Please describe the edit you want to make.";
const UNEXPECTED_FAILURE: &str = "An unexpected error occurred while processing the image.";

/// Checks a selected file before it is read.
///
/// The content category is checked before the size; the first failure wins.
pub fn validate_file(file: &SelectedFile) -> Result<()> {
    if !file.media_type().starts_with("image/") {
        return Err(RetouchError::InvalidFile(NOT_AN_IMAGE.into()));
    }
    if file.size() > MAX_FILE_SIZE {
        return Err(RetouchError::InvalidFile(FILE_TOO_LARGE.into()));
    }
    Ok(())
}

/// Reduces any failure to the message shown to the user.
pub fn user_message(err: &RetouchError) -> String {
    match err {
        RetouchError::InvalidFile(msg) => msg.clone(),
        RetouchError::MalformedInput(_) => {
            "The selected image could not be read. Please choose it again.".into()
        }
        RetouchError::EmptyResponse => "No response was received from the model.".into(),
        RetouchError::ModelRefusal(text) => {
            format!("The image could not be transformed. Model replied: {text}")
        }
        RetouchError::NoImageProduced => "No image was found in the model response.".into(),
        RetouchError::GenerationFailed(msg) if msg.trim().is_empty() => UNEXPECTED_FAILURE.into(),
        RetouchError::GenerationFailed(msg) => msg.clone(),
        RetouchError::Config(msg) => msg.clone(),
        RetouchError::Io(e) => format!("Failed to read the image file: {e}"),
    }
}

struct ControllerState {
    session: TransformSession,
    generation: u64,
    in_flight: Option<AbortHandle>,
}

impl ControllerState {
    /// Cancels the outstanding request, if any, and retires its generation.
    fn invalidate(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.in_flight.take() {
            tracing::debug!("cancelling in-flight transform");
            handle.abort();
        }
        self.session.is_busy = false;
    }
}

struct Inner<T> {
    transformer: T,
    state: Mutex<ControllerState>,
}

impl<T> Inner<T> {
    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn complete(&self, generation: u64, result: Result<String>) {
        let mut state = self.state();
        if state.generation != generation {
            tracing::debug!(generation, "discarding stale transform result");
            return;
        }
        state.in_flight = None;
        match result {
            Ok(uri) => {
                state.session.transformed_image = Some(uri);
                state.session.is_busy = false;
            }
            Err(e) => {
                tracing::warn!("transform failed: {e}");
                state.session.fail(user_message(&e));
            }
        }
    }
}

/// Owns the session and the transformer used to fulfil submits.
pub struct TransformController<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for TransformController<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ImageTransformer + 'static> TransformController<T> {
    /// Creates a controller with an empty session.
    pub fn new(transformer: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                transformer,
                state: Mutex::new(ControllerState {
                    session: TransformSession::new(),
                    generation: 0,
                    in_flight: None,
                }),
            }),
        }
    }

    /// Returns a snapshot of the current session.
    pub fn session(&self) -> TransformSession {
        self.inner.state().session.clone()
    }

    /// Validates and loads a new source image.
    ///
    /// On success the session is replaced: the prompt, any previous result
    /// and any error are cleared. On failure only `error` changes, except
    /// that an outstanding request is cancelled.
    pub async fn select_image(&self, file: &SelectedFile) {
        if let Err(e) = validate_file(file) {
            tracing::debug!(
                name = file.name(),
                media_type = file.media_type(),
                size = file.size(),
                "rejected selected file"
            );
            self.fail_selection(&e);
            return;
        }

        let bytes = match file.read().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(name = file.name(), "failed to read selected file: {e}");
                self.fail_selection(&RetouchError::Io(e));
                return;
            }
        };
        // The file may have grown since its size was declared.
        if bytes.len() as u64 > MAX_FILE_SIZE {
            self.fail_selection(&RetouchError::InvalidFile(FILE_TOO_LARGE.into()));
            return;
        }
        let uri = data_uri::encode(&bytes, file.media_type());

        let mut state = self.inner.state();
        state.invalidate();
        state.session = TransformSession::with_original(uri);
    }

    fn fail_selection(&self, err: &RetouchError) {
        let mut state = self.inner.state();
        if state.session.is_busy {
            state.invalidate();
        }
        state.session.fail(user_message(err));
    }

    /// Replaces the prompt.
    pub fn edit_prompt(&self, text: impl Into<String>) {
        self.inner.state().session.prompt = text.into();
    }

    /// Sends the current image and prompt to the transformer and waits for
    /// the outcome to be applied.
    ///
    /// Rejected without any state change while another transform is
    /// outstanding. Must be called from within a tokio runtime.
    pub async fn submit_transform(&self) {
        let (task, generation) = {
            let mut state = self.inner.state();
            if state.session.is_busy {
                tracing::warn!("transform already in progress; ignoring submit");
                return;
            }
            let Some(original) = state.session.original_image.clone() else {
                state.session.error = Some(NO_IMAGE_SELECTED.into());
                return;
            };
            if state.session.prompt.trim().is_empty() {
                state.session.error = Some(EMPTY_PROMPT.into());
                return;
            }
            let decoded = match data_uri::decode(&original) {
                Ok(decoded) => decoded,
                Err(e) => {
                    state.session.fail(user_message(&e));
                    return;
                }
            };
            let request = TransformRequest::from_data_uri(decoded, state.session.prompt.clone());

            state.session.is_busy = true;
            state.session.error = None;
            state.generation += 1;
            let generation = state.generation;

            tracing::debug!(
                generation,
                transformer = self.inner.transformer.name(),
                "submitting transform"
            );

            let inner = Arc::clone(&self.inner);
            let task = tokio::spawn(async move {
                let result = inner.transformer.transform(&request).await;
                inner.complete(generation, result);
            });
            state.in_flight = Some(task.abort_handle());
            (task, generation)
        };

        match task.await {
            Ok(()) => {}
            Err(e) if e.is_cancelled() => {
                tracing::debug!(generation, "transform cancelled");
            }
            Err(e) => {
                tracing::warn!(generation, "transform task failed: {e}");
                self.inner.complete(
                    generation,
                    Err(RetouchError::GenerationFailed(UNEXPECTED_FAILURE.into())),
                );
            }
        }
    }

    /// Discards the session and starts over, cancelling any outstanding
    /// request.
    pub fn reset(&self) {
        let mut state = self.inner.state();
        state.invalidate();
        state.session = TransformSession::new();
    }

    /// Clears the error message only.
    pub fn dismiss_error(&self) {
        self.inner.state().session.error = None;
    }

    /// Offers the transformed image for saving. Returns false if there is
    /// nothing to save.
    pub fn download(&self, downloader: &dyn Downloader) -> bool {
        let Some(uri) = self.session().transformed_image else {
            return false;
        };
        downloader.trigger(&uri, DEFAULT_DOWNLOAD_NAME);
        true
    }
}
