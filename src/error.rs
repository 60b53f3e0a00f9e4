//! Error types for the prompt studio.

use thiserror::Error;

/// Result type alias for studio operations.
pub type StudioResult<T> = Result<T, StudioError>;

/// Errors that can occur while composing, persisting or generating.
#[derive(Error, Debug)]
pub enum StudioError {
    /// No credential has been configured for the remote capability.
    #[error("API Key is not configured. Please set your API key in the application.")]
    MissingCredential,

    /// A required input field is blank or absent.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The remote capability answered with an error.
    #[error("Remote API error: {message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },

    /// The request never reached the remote capability, or its response was cut off.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The remote capability answered successfully but without usable content.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local key-value persistence failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Uploaded image payload is unusable.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// Character id is not present in the registry.
    #[error("Character not found: {0}")]
    UnknownCharacter(i64),
}

impl StudioError {
    /// Creates a Validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a Remote error.
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Creates a Transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a MalformedResponse error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Creates a Storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Creates an InvalidImage error.
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Returns true for errors raised before any request left the process.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::MissingCredential | Self::Validation(_) | Self::InvalidImage(_)
        )
    }
}

#[cfg(feature = "gemini")]
impl From<reqwest::Error> for StudioError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::remote(Some(status.as_u16()), err.to_string()),
            None => Self::transport(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_display_carries_message() {
        let err = StudioError::remote(Some(429), "[429 RESOURCE_EXHAUSTED] quota exceeded");
        assert_eq!(
            err.to_string(),
            "Remote API error: [429 RESOURCE_EXHAUSTED] quota exceeded"
        );
    }

    #[test]
    fn test_missing_credential_mentions_api_key() {
        assert!(StudioError::MissingCredential.to_string().contains("API Key"));
    }

    #[test]
    fn test_is_local() {
        assert!(StudioError::validation("blank idea").is_local());
        assert!(StudioError::MissingCredential.is_local());
        assert!(!StudioError::transport("connection reset").is_local());
    }
}
