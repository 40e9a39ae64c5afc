use github_attachments::ApiError;
use thiserror::Error;

/// Errors that abort one file's upload
#[derive(Error, Debug)]
pub enum UploadError {
    /// Repository lookup, policy or completion call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Object storage rejected the form POST
    #[error("storage upload failed with HTTP {status}: {body}")]
    UploadFailed { status: u16, body: String },

    /// Transport failure talking to object storage
    #[error("storage request error: {0}")]
    Request(#[from] reqwest::Error),

    /// File exceeds the configured attachment size limit
    #[error("file is {size} bytes, larger than the {limit} byte limit")]
    FileTooLarge { size: u64, limit: u64 },

    /// Upload cancelled by the caller
    #[error("upload cancelled")]
    Cancelled,
}

impl UploadError {
    /// Check if the user has to capture a new session cookie
    pub fn requires_new_session(&self) -> bool {
        matches!(self, UploadError::Api(e) if e.requires_new_session())
    }

    /// One-line text for a UI notice
    pub fn user_message(&self, file_name: &str) -> String {
        match self {
            UploadError::Api(ApiError::SessionExpired { .. }) => format!(
                "Upload of {} failed: your GitHub session expired. Paste a fresh user_session cookie in the plugin settings.",
                file_name
            ),
            UploadError::Api(ApiError::MissingCredential) => format!(
                "Upload of {} skipped: set your GitHub user_session cookie in the plugin settings.",
                file_name
            ),
            UploadError::Cancelled => format!("Upload of {} cancelled.", file_name),
            other => format!("Upload of {} failed: {}", file_name, other),
        }
    }
}

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;
