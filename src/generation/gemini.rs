//! Gemini REST adapter.

use async_trait::async_trait;
use base64::Engine;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use crate::prompt::{Contents, Part};

use super::backend::{GenerationBackend, ImageOptions};
use super::model::GeneratedImage;

const X_GOOG_API_KEY: &str = "x-goog-api-key";
const DEFAULT_STATUS_MESSAGE: &str = "Gemini API request failed";

/// HTTP client for the text and image endpoints.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
    client: Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("text_model", &self.text_model)
            .field("image_model", &self.image_model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// `BackendFactory` for `Orchestrator::new`.
pub fn gemini_factory(credential: &str, config: &StudioConfig) -> StudioResult<GeminiClient> {
    GeminiClient::new(credential, config)
}

impl GeminiClient {
    pub fn new(api_key: &str, config: &StudioConfig) -> StudioResult<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(StudioError::MissingCredential);
        }

        #[allow(unused_mut)]
        let mut builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(secs) = config.timeout_secs {
                builder = builder.timeout(std::time::Duration::from_secs(secs));
            }
        }
        let client = builder
            .build()
            .map_err(|e| StudioError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
            client,
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/v1beta/models/{}:{}", self.base_url, model, method)
    }

    async fn post<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        body: &Req,
    ) -> StudioResult<Resp> {
        let response = self
            .client
            .post(url)
            .header(X_GOOG_API_KEY, &self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if !status.is_success() {
            return Err(error_from_response(status, &body_text));
        }

        serde_json::from_str(&body_text)
            .map_err(|e| StudioError::malformed(format!("Failed to parse response: {e}")))
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: WireContent<'a>,
    contents: Vec<WireContent<'a>>,
}

#[derive(Debug, Serialize)]
struct WireContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<WirePart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum WirePart<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Inline {
        inline_data: InlineData<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

impl<'a> From<&'a Part> for WirePart<'a> {
    fn from(part: &'a Part) -> Self {
        match part {
            Part::Text(text) => WirePart::Text { text },
            Part::InlineImage(image) => WirePart::Inline {
                inline_data: InlineData {
                    mime_type: &image.mime_type,
                    data: &image.data,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
    parameters: PredictParameters<'a>,
}

#[derive(Debug, Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters<'a> {
    sample_count: u32,
    aspect_ratio: &'static str,
    output_options: OutputOptions<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutputOptions<'a> {
    mime_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    bytes_base64_encoded: Option<String>,
    mime_type: Option<String>,
}

// =============================================================================
// ERRORS
// =============================================================================

/// `[<code> <STATUS>] <message>` from a Google error body, or the raw body.
fn extract_error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    let parsed = serde_json::from_str::<serde_json::Value>(body).ok()?;
    let error = parsed.get("error")?;
    let message = error.get("message").and_then(|m| m.as_str())?;
    let code = error.get("code").and_then(|c| c.as_u64());
    let status = error.get("status").and_then(|s| s.as_str());

    Some(match (code, status) {
        (Some(code), Some(status)) => format!("[{code} {status}] {message}"),
        (Some(code), None) => format!("[{code}] {message}"),
        (None, Some(status)) => format!("[{status}] {message}"),
        (None, None) => message.to_string(),
    })
}

fn error_from_response(status: StatusCode, body: &str) -> StudioError {
    let message = extract_error_message(body).unwrap_or_else(|| {
        if !body.trim().is_empty() {
            format!("[{}] {}", status.as_u16(), body.trim())
        } else {
            format!("[{}] {}", status.as_u16(), DEFAULT_STATUS_MESSAGE)
        }
    });
    StudioError::remote(Some(status.as_u16()), message)
}

// =============================================================================
// BACKEND
// =============================================================================

#[async_trait(?Send)]
impl GenerationBackend for GeminiClient {
    async fn generate_text(
        &self,
        system_instruction: &str,
        contents: &Contents,
    ) -> StudioResult<String> {
        let request = GenerateContentRequest {
            system_instruction: WireContent {
                role: None,
                parts: vec![WirePart::Text {
                    text: system_instruction,
                }],
            },
            contents: vec![WireContent {
                role: Some("user"),
                parts: contents.parts.iter().map(WirePart::from).collect(),
            }],
        };

        let url = self.endpoint(&self.text_model, "generateContent");
        tracing::debug!(model = %self.text_model, "Calling generateContent");
        let response: GenerateContentResponse = self.post(&url, &request).await?;

        let text: String = response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        let text = text.trim();
        if text.is_empty() {
            return Err(StudioError::malformed("response contained no text"));
        }
        Ok(text.to_string())
    }

    async fn generate_images(
        &self,
        prompt: &str,
        options: &ImageOptions,
    ) -> StudioResult<Vec<GeneratedImage>> {
        let request = PredictRequest {
            instances: vec![PredictInstance { prompt }],
            parameters: PredictParameters {
                sample_count: options.count,
                aspect_ratio: options.aspect_ratio.as_str(),
                output_options: OutputOptions {
                    mime_type: &options.output_mime_type,
                },
            },
        };

        let url = self.endpoint(&self.image_model, "predict");
        tracing::debug!(
            model = %self.image_model,
            count = options.count,
            aspect_ratio = %options.aspect_ratio,
            "Calling predict"
        );
        let response: PredictResponse = self.post(&url, &request).await?;

        response
            .predictions
            .into_iter()
            .filter_map(|p| {
                let data = p.bytes_base64_encoded?;
                Some((p.mime_type, data))
            })
            .map(|(mime_type, data)| -> StudioResult<GeneratedImage> {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(data.trim())
                    .map_err(|e| StudioError::malformed(format!("image is not base64: {e}")))?;
                let mime_type = mime_type.unwrap_or_else(|| options.output_mime_type.clone());
                Ok(GeneratedImage::new(mime_type, bytes))
            })
            .collect()
    }
}
