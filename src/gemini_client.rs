//! Google Gemini API client for the generation pipeline
//!
//! Thin wrapper around the generateContent endpoint covering the three calls
//! the orchestrator needs: ad-image rendering, Search-grounded caption
//! writing, and schema-constrained style analysis. The API key is injected
//! at construction; there is no process-wide client singleton, so tests can
//! substitute a fake [`GenerativeBackend`] without shared state.

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use crate::assets::AssetPayload;
use crate::errors::{ClassifiedError, ErrorKind};
use crate::models::{AspectRatio, GenerationConfig, GroundingSource, Quality};
use crate::niches::NicheProfile;
use crate::visual_dna;

const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const STANDARD_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
const ULTRA_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";
const TEXT_MODEL: &str = "gemini-3-flash-preview";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// One inline image attachment extracted from a model response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 payload as returned by the API
    pub data: String,
}

impl InlineImage {
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Caption text plus its grounding citations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionResult {
    pub text: String,
    pub sources: Vec<GroundingSource>,
}

/// Seam between the orchestrator and the generative service.
///
/// Errors are raw provider strings; the orchestrator runs them through
/// [`crate::errors::classify`]. `render_image` returning `Ok(None)` means
/// the call succeeded but produced no inline image part.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    async fn render_image(
        &self,
        brief: &str,
        attachments: &[&AssetPayload],
        aspect_ratio: AspectRatio,
        quality: Quality,
    ) -> Result<Option<InlineImage>, String>;

    async fn write_caption(
        &self,
        niche: &NicheProfile,
        config: &GenerationConfig,
    ) -> Result<CaptionResult, String>;

    /// Raw structured-output text for the visual DNA extractor
    async fn analyze_style_reference(&self, reference: &AssetPayload) -> Result<String, String>;
}

// -- Response types --

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponsePart {
    inline_data: Option<GeminiInlineData>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    #[serde(default = "default_image_mime")]
    mime_type: String,
    data: String,
}

fn default_image_mime() -> String {
    "image/png".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    // Manual impl: the key must never reach logs or panic messages
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Largest prefix of `body` within `max` bytes that does not split a character
fn truncate_error_body(body: &str, max: usize) -> &str {
    if body.len() <= max {
        return body;
    }
    let mut end = max;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

impl GeminiClient {
    /// Build a client for one credential. A blank key is the local
    /// `CredentialsMissing` condition, distinct from a key the remote
    /// service rejects.
    pub fn new(api_key: &str) -> Result<Self, ClassifiedError> {
        if api_key.trim().is_empty() {
            return Err(ClassifiedError::new(ErrorKind::CredentialsMissing));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| ClassifiedError {
                kind: ErrorKind::Unknown,
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
        })
    }

    fn image_model(quality: Quality) -> &'static str {
        match quality {
            Quality::Standard => STANDARD_IMAGE_MODEL,
            Quality::Ultra => ULTRA_IMAGE_MODEL,
        }
    }

    // -- Pure request builders (unit-testable without network) --

    pub fn build_image_request(
        brief: &str,
        attachments: &[&AssetPayload],
        aspect_ratio: AspectRatio,
    ) -> serde_json::Value {
        let mut parts = vec![serde_json::json!({ "text": brief })];
        for asset in attachments {
            parts.push(serde_json::json!({
                "inlineData": {
                    "mimeType": asset.mime_type(),
                    "data": asset.to_base64()
                }
            }));
        }
        serde_json::json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "responseModalities": ["IMAGE"],
                "imageConfig": {
                    "aspectRatio": aspect_ratio.as_str()
                }
            }
        })
    }

    pub fn build_caption_request(niche: &NicheProfile, config: &GenerationConfig) -> serde_json::Value {
        let context = if config.has_meaningful_text() {
            config.text.trim()
        } else {
            niche.default_brief_text()
        };
        let prompt = format!(
            "Persona: Especialista em Marketing Digital.\n\
Nicho: {}.\n\
Contexto: {}.\n\
Tarefa: Criar legenda persuasiva para Instagram com Emojis, Hashtags e CTA.\n\
Idioma: Português do Brasil.",
            niche.name, context
        );
        serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "tools": [{ "googleSearch": {} }]
        })
    }

    pub fn build_analysis_request(reference: &AssetPayload) -> serde_json::Value {
        serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": visual_dna::ANALYSIS_PROMPT },
                    {
                        "inlineData": {
                            "mimeType": reference.mime_type(),
                            "data": reference.to_base64()
                        }
                    }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": visual_dna::response_schema()
            }
        })
    }

    // -- Pure response extractors --

    /// First inline image part of the first candidate, if any
    pub fn extract_inline_image(response: &GeminiResponse) -> Option<InlineImage> {
        response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|content| content.parts.iter().find_map(|p| p.inline_data.as_ref()))
            .map(|d| InlineImage {
                mime_type: d.mime_type.clone(),
                data: d.data.clone(),
            })
    }

    /// Concatenated text of the first candidate plus its grounding sources
    pub fn extract_caption(response: &GeminiResponse) -> CaptionResult {
        let Some(candidate) = response.candidates.first() else {
            return CaptionResult::default();
        };
        let text = candidate
            .content
            .as_ref()
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        let sources = candidate
            .grounding_metadata
            .as_ref()
            .map(|meta| {
                meta.grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref())
                    .filter_map(|web| {
                        web.uri.as_ref().map(|uri| GroundingSource {
                            uri: uri.clone(),
                            title: web.title.clone(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        CaptionResult { text, sources }
    }

    async fn post(&self, model: &str, body: &serde_json::Value) -> Result<GeminiResponse, String> {
        let url = format!("{}/{}:generateContent", GEMINI_ENDPOINT, model);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(
                "x-goog-api-key",
                HeaderValue::from_str(&self.api_key)
                    .map_err(|e| format!("Invalid API key header: {}", e))?,
            )
            .json(body)
            .send()
            .await
            .map_err(|e| format!("Gemini API request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            // Truncate error body to avoid leaking sensitive data
            let truncated = truncate_error_body(&error_body, 300);
            return Err(format!("Gemini API error {}: {}", status, truncated));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse Gemini response: {}", e))
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn render_image(
        &self,
        brief: &str,
        attachments: &[&AssetPayload],
        aspect_ratio: AspectRatio,
        quality: Quality,
    ) -> Result<Option<InlineImage>, String> {
        let body = Self::build_image_request(brief, attachments, aspect_ratio);
        info!(
            brief_chars = brief.len(),
            attachments = attachments.len(),
            aspect_ratio = aspect_ratio.as_str(),
            "Gemini image generation"
        );
        let response = self.post(Self::image_model(quality), &body).await?;
        Ok(Self::extract_inline_image(&response))
    }

    async fn write_caption(
        &self,
        niche: &NicheProfile,
        config: &GenerationConfig,
    ) -> Result<CaptionResult, String> {
        let body = Self::build_caption_request(niche, config);
        info!(niche = %niche.id, "Gemini caption generation");
        let response = self.post(TEXT_MODEL, &body).await?;
        Ok(Self::extract_caption(&response))
    }

    async fn analyze_style_reference(&self, reference: &AssetPayload) -> Result<String, String> {
        let body = Self::build_analysis_request(reference);
        info!(
            reference_bytes = reference.bytes().len(),
            "Gemini style analysis"
        );
        let response = self.post(TEXT_MODEL, &body).await?;
        let text = Self::extract_caption(&response).text;
        if text.is_empty() {
            return Err("Style analysis returned no text".to_string());
        }
        Ok(text)
    }
}
