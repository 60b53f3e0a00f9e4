//! Session-wide configuration for the remote capability and local persistence slots.

use serde::{Deserialize, Serialize};

use crate::error::StudioResult;

/// Default Gemini REST endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default text model used for every prompt-writing call.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
/// Default image synthesis model.
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
/// Storage slot holding the credential string.
pub const DEFAULT_CREDENTIAL_KEY: &str = "gemini-api-key";
/// Storage slot holding the character library as a JSON array.
pub const DEFAULT_CHARACTERS_KEY: &str = "veo-project-characters";

/// Studio configuration.
///
/// Every field has a default, so hosts only override what they need:
///
/// ```rust
/// use scenecraft::StudioConfig;
///
/// let config = StudioConfig::from_json(r#"{"text_model": "gemini-2.0-flash"}"#).unwrap();
/// assert_eq!(config.text_model, "gemini-2.0-flash");
/// assert_eq!(config.image_count, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StudioConfig {
    /// Base URL of the generative API (no trailing slash required).
    pub api_base_url: String,
    /// Model used for text generation and image analysis.
    pub text_model: String,
    /// Model used for image synthesis.
    pub image_model: String,
    /// Number of images requested per synthesis call.
    pub image_count: u32,
    /// Output MIME type requested from the image model.
    pub image_mime_type: String,
    /// Local storage key for the credential.
    pub credential_key: String,
    /// Local storage key for the character library.
    pub characters_key: String,
    /// Transport timeout in seconds (native builds only).
    pub timeout_secs: Option<u64>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            image_count: 1,
            image_mime_type: "image/jpeg".to_string(),
            credential_key: DEFAULT_CREDENTIAL_KEY.to_string(),
            characters_key: DEFAULT_CHARACTERS_KEY.to_string(),
            timeout_secs: None,
        }
    }
}

impl StudioConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a (possibly partial) JSON configuration.
    pub fn from_json(json: &str) -> StudioResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// With API base URL
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// With text model
    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    /// With image model
    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    /// With number of images per synthesis call
    pub fn with_image_count(mut self, count: u32) -> Self {
        self.image_count = count.max(1);
        self
    }

    /// With storage slot keys
    pub fn with_storage_keys(
        mut self,
        credential_key: impl Into<String>,
        characters_key: impl Into<String>,
    ) -> Self {
        self.credential_key = credential_key.into();
        self.characters_key = characters_key.into();
        self
    }

    /// With transport timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}
