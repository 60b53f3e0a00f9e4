//! Remote error classification.
//!
//! The remote capability reports failures as free text, so classification is substring
//! matching. All matching lives here.

use crate::error::StudioError;

use super::model::FailureKind;

/// Substrings that mark a rejected or missing credential. Checked first.
const CREDENTIAL_MARKERS: &[&str] = &["API Key", "API key", "API_KEY"];

/// Substrings that mark resource exhaustion.
const QUOTA_MARKERS: &[&str] = &["quota", "Quota", "RESOURCE_EXHAUSTED"];

const CREDENTIAL_STATUS: u16 = 400;
const QUOTA_STATUS: u16 = 429;

/// Classifies an error. Anything unmatched is `Unknown`.
///
/// Status codes count only for remote API errors, where they come from the response
/// (`status`) or its `[code STATUS]` message prefix. Other errors are matched on text alone.
pub fn classify_failure(err: &StudioError) -> FailureKind {
    if matches!(err, StudioError::MissingCredential) {
        return FailureKind::InvalidCredential;
    }

    let text = err.to_string();
    let has_status = |code: u16| match err {
        StudioError::Remote { status, message } => {
            *status == Some(code) || message.contains(&code.to_string())
        }
        _ => false,
    };

    if has_status(CREDENTIAL_STATUS) || CREDENTIAL_MARKERS.iter().any(|m| text.contains(m)) {
        FailureKind::InvalidCredential
    } else if has_status(QUOTA_STATUS) || QUOTA_MARKERS.iter().any(|m| text.contains(m)) {
        FailureKind::QuotaExceeded
    } else {
        FailureKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key() {
        let err = StudioError::remote(
            Some(400),
            "[400 INVALID_ARGUMENT] API key not valid. Please pass a valid API key.",
        );
        assert_eq!(classify_failure(&err), FailureKind::InvalidCredential);
        assert_eq!(
            classify_failure(&StudioError::MissingCredential),
            FailureKind::InvalidCredential
        );
    }

    #[test]
    fn test_quota() {
        let err = StudioError::remote(
            Some(429),
            "[429 RESOURCE_EXHAUSTED] You exceeded your current quota",
        );
        assert_eq!(classify_failure(&err), FailureKind::QuotaExceeded);
    }

    #[test]
    fn test_credential_wins_over_quota() {
        let err = StudioError::remote(None, "API_KEY quota exceeded");
        assert_eq!(classify_failure(&err), FailureKind::InvalidCredential);
    }

    #[test]
    fn test_status_codes_only_count_for_remote_errors() {
        let err = StudioError::transport(
            "error sending request for url (http://127.0.0.1:4000/v1beta)",
        );
        assert_eq!(classify_failure(&err), FailureKind::Unknown);
        assert_eq!(
            classify_failure(&StudioError::storage("slot 4291 unavailable")),
            FailureKind::Unknown
        );

        assert_eq!(
            classify_failure(&StudioError::remote(Some(400), "Bad Request")),
            FailureKind::InvalidCredential
        );
        assert_eq!(
            classify_failure(&StudioError::remote(None, "[429 TOO_MANY_REQUESTS] slow down")),
            FailureKind::QuotaExceeded
        );
    }

    #[test]
    fn test_unmatched_is_unknown() {
        assert_eq!(
            classify_failure(&StudioError::transport("connection reset by peer")),
            FailureKind::Unknown
        );
        assert_eq!(
            classify_failure(&StudioError::remote(Some(503), "[503 UNAVAILABLE] overloaded")),
            FailureKind::Unknown
        );
    }
}
