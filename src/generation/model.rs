//! Data models for generation results and failures.

use base64::Engine;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::scene::GenerationMode;

// =============================================================================
// STATE
// =============================================================================

/// Orchestrator state. At most one call is in flight per session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "mode", rename_all = "camelCase")]
pub enum GenerationState {
    #[default]
    Idle,
    InFlight(GenerationMode),
}

impl GenerationState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight(_))
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// One synthesized image.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl GeneratedImage {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// `data:<mime>;base64,<payload>`, ready for an `<img src>`.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

impl Serialize for GeneratedImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("GeneratedImage", 2)?;
        state.serialize_field("mimeType", &self.mime_type)?;
        state.serialize_field("dataUrl", &self.to_data_url())?;
        state.end()
    }
}

/// Output of the last successful call. Replaced wholesale by the next call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    /// For image requests this is the text actually sent to image synthesis.
    pub prompt_text: String,
    pub media: Option<Vec<GeneratedImage>>,
}

impl GenerationResult {
    pub fn text(prompt_text: impl Into<String>) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            media: None,
        }
    }

    pub fn with_images(prompt_text: impl Into<String>, images: Vec<GeneratedImage>) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            media: Some(images),
        }
    }

    pub fn images(&self) -> &[GeneratedImage] {
        self.media.as_deref().unwrap_or_default()
    }
}

// =============================================================================
// FAILURES
// =============================================================================

/// Failure classes shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureKind {
    InvalidCredential,
    QuotaExceeded,
    Unknown,
}

impl FailureKind {
    /// Localized message for the form.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredential => "API Key không hợp lệ hoặc đã hết hạn. Vui lòng kiểm tra lại.",
            Self::QuotaExceeded => "Đã vượt quá hạn mức sử dụng API. Vui lòng thử lại sau.",
            Self::Unknown => "Đã xảy ra lỗi. Vui lòng kiểm tra console và thử lại.",
        }
    }

    /// Only a rejected credential sends the user back to the credential prompt.
    pub fn reopens_credential_prompt(&self) -> bool {
        matches!(self, Self::InvalidCredential)
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::InvalidCredential => "invalid_credential",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A classified remote failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationFailure {
    pub kind: FailureKind,
    /// User-facing message.
    pub message: String,
    pub reopen_credential_prompt: bool,
    /// Underlying error text, for the console.
    pub detail: String,
}

impl GenerationFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            message: kind.user_message().to_string(),
            reopen_credential_prompt: kind.reopens_credential_prompt(),
            detail: detail.into(),
        }
    }
}

// =============================================================================
// OUTCOMES
// =============================================================================

/// What a generate call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum GenerationOutcome {
    Completed(GenerationResult),
    Failed(GenerationFailure),
    /// Another call was in flight; nothing changed.
    Ignored,
    /// The request failed validation and was never issued.
    Rejected(String),
}

/// What a character analysis call did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum AnalysisOutcome {
    Described(String),
    Failed(GenerationFailure),
    Ignored,
}
