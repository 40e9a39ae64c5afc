use thiserror::Error;

/// Main error type for the attachments client
#[derive(Error, Debug)]
pub enum ApiError {
    /// Repository metadata could not be fetched or had no id
    #[error("failed to resolve repository {repository}: {message}")]
    RepoResolution { repository: String, message: String },

    /// The upload policy request was rejected, which means the session
    /// cookie is no longer accepted
    #[error(
        "GitHub rejected the session (HTTP {status}). Copy a fresh `user_session` cookie from your browser and update the plugin settings"
    )]
    SessionExpired { status: u16 },

    /// The finalize request for an uploaded asset failed
    #[error("failed to complete asset upload (HTTP {status}): {message}")]
    Completion { status: u16, message: String },

    /// No session cookie configured
    #[error("no session cookie configured")]
    MissingCredential,

    /// Repository string is not `owner/name`
    #[error("invalid repository `{0}`, expected `owner/name`")]
    InvalidRepository(String),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Check if this error requires the user to capture a new session cookie
    pub fn requires_new_session(&self) -> bool {
        matches!(
            self,
            ApiError::SessionExpired { .. } | ApiError::MissingCredential
        )
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_expired_message_mentions_cookie() {
        let err = ApiError::SessionExpired { status: 422 };
        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("cookie"));
        assert!(err.requires_new_session());
    }

    #[test]
    fn test_completion_does_not_require_session() {
        let err = ApiError::Completion {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!err.requires_new_session());
    }
}
