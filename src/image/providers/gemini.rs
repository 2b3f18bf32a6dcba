//! Gemini (Google) image transformer.

use crate::config::ClientConfig;
use crate::error::{sanitize_error_message, RetouchError, Result};
use crate::image::provider::ImageTransformer;
use crate::image::types::TransformRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Media type every transformed image is presented as.
const OUTPUT_MEDIA_TYPE: &str = "image/png";

/// Wraps the user's instruction in the steering template sent to the model.
pub fn wrap_prompt(prompt: &str) -> String {
    format!(
        "Transform this image based on the following instruction: {prompt}. Return only the transformed image."
    )
}

/// Builder for GeminiTransformer.
#[derive(Debug, Clone, Default)]
pub struct GeminiTransformerBuilder {
    config: Option<ClientConfig>,
    api_key: Option<String>,
    base_url: Option<String>,
}

impl GeminiTransformerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a complete client config.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the API key. Overrides the key of a supplied config.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the transformer. The environment is never consulted.
    pub fn build(self) -> Result<GeminiTransformer> {
        let mut config = match (self.config, self.api_key) {
            (Some(mut config), Some(key)) => {
                config.api_key = key;
                config
            }
            (Some(config), None) => config,
            (None, Some(key)) => ClientConfig::new(key),
            (None, None) => {
                return Err(RetouchError::Config("no API key provided".into()));
            }
        };
        if config.api_key.trim().is_empty() {
            return Err(RetouchError::Config("API key is empty".into()));
        }
        if let Some(url) = self.base_url {
            config = config.with_base_url(url);
        }

        Ok(GeminiTransformer {
            client: reqwest::Client::new(),
            config,
        })
    }
}

/// Gemini image transformer.
pub struct GeminiTransformer {
    client: reqwest::Client,
    config: ClientConfig,
}

impl GeminiTransformer {
    /// Creates a new `GeminiTransformerBuilder`.
    pub fn builder() -> GeminiTransformerBuilder {
        GeminiTransformerBuilder::new()
    }

    /// Returns the model identifier requests are sent to.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }

    async fn transform_impl(&self, request: &TransformRequest) -> Result<String> {
        let start = Instant::now();
        let body = GeminiRequest::from_transform_request(request);

        tracing::debug!(
            model = %self.config.model,
            mime_type = %request.mime_type,
            "sending Gemini transform request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text));
        }

        let text = response.text().await?;
        let gemini_response: GeminiResponse = serde_json::from_str(&text)?;
        let result = extract_image(gemini_response);

        tracing::debug!(
            duration_ms = start.elapsed().as_millis() as u64,
            success = result.is_ok(),
            "Gemini transform request complete"
        );
        result
    }
}

#[async_trait]
impl ImageTransformer for GeminiTransformer {
    async fn transform(&self, request: &TransformRequest) -> Result<String> {
        self.transform_impl(request).await
    }

    fn name(&self) -> &str {
        "Gemini (Google)"
    }
}

/// Maps a non-success HTTP response to a generation failure.
fn parse_error(status: u16, text: &str) -> RetouchError {
    let message = serde_json::from_str::<GeminiErrorResponse>(text)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| {
            if text.trim().is_empty() {
                format!("HTTP {status}")
            } else {
                format!("HTTP {status}: {text}")
            }
        });
    RetouchError::GenerationFailed(sanitize_error_message(&message))
}

/// Picks the transformed image out of a Gemini response.
///
/// Only the first candidate is considered. The first inline-data part wins
/// and is always presented as PNG; otherwise the first non-empty text part
/// is treated as the model's refusal.
fn extract_image(response: GeminiResponse) -> Result<String> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
            tracing::debug!(block_reason = %reason, "Gemini returned no candidates");
        }
        return Err(RetouchError::EmptyResponse);
    };

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

    if let Some(inline) = parts.iter().find_map(|p| p.inline_data.as_ref()) {
        return Ok(format!("data:{};base64,{}", OUTPUT_MEDIA_TYPE, inline.data));
    }

    match parts
        .into_iter()
        .filter_map(|p| p.text)
        .find(|t| !t.is_empty())
    {
        Some(text) => Err(RetouchError::ModelRefusal(text)),
        None => Err(RetouchError::NoImageProduced),
    }
}

// Request/Response types
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - can be text or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: GeminiInlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

impl GeminiRequest {
    fn from_transform_request(req: &TransformRequest) -> Self {
        let parts = vec![
            GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: req.mime_type.clone(),
                    data: req.image_base64.clone(),
                },
            },
            GeminiRequestPart::Text {
                text: wrap_prompt(&req.prompt),
            },
        ];

        Self {
            contents: vec![GeminiContent { parts }],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[allow(dead_code)]
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
}
