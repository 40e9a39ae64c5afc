//! Attachment uploader
//!
//! Runs the flow for one file: resolve the repository id, request an upload
//! policy, POST the file to object storage, and acknowledge completion.
//! Uploads sharing one [`Uploader`] run independently of each other.

mod error;
pub mod mime;
pub mod multipart;
mod storage;

pub use error::{UploadError, UploadResult};
pub use multipart::FilePart;

use bytes::Bytes;
use github_attachments::Client as GhClient;
use github_attachments::api::AssetsApi;
use github_attachments::models::UploadPolicyRequest;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// GitHub's attachment limit for non-image files
pub const DEFAULT_MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

/// Configuration for the uploader
#[derive(Debug, Clone)]
pub struct UploaderConfig {
    /// Files above this size fail before any request is made
    pub max_file_size: Option<u64>,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
        }
    }
}

/// Links produced by a successful upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadLinks {
    /// Permanent `user-attachments` URL
    pub github_link: String,
    /// Object-storage location from the upload response, not guaranteed stable
    pub aws_link: String,
}

/// Main uploader struct
pub struct Uploader {
    /// GitHub client for repository lookup, policies and completion
    gh_client: Arc<GhClient>,
    /// Uploader configuration
    config: UploaderConfig,
    /// Cancellation token for stopping uploads
    cancel_token: CancellationToken,
}

impl Uploader {
    /// Create a new uploader instance
    pub fn new(gh_client: Arc<GhClient>, config: UploaderConfig) -> Self {
        Self {
            gh_client,
            config,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Create uploader with a custom cancellation token
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    /// Cancel every upload running under the uploader's own token
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn client(&self) -> &Arc<GhClient> {
        &self.gh_client
    }

    /// Upload one file under the uploader's cancellation token
    pub async fn upload(&self, name: &str, size: u64, data: Bytes) -> UploadResult<UploadLinks> {
        self.upload_with_cancel(name, size, data, &self.cancel_token)
            .await
    }

    /// Upload one file, aborting in-flight requests once `cancel` fires
    ///
    /// A failed completion call is logged and the links are still returned,
    /// since the asset is already stored and its permanent link resolves.
    pub async fn upload_with_cancel(
        &self,
        name: &str,
        size: u64,
        data: Bytes,
        cancel: &CancellationToken,
    ) -> UploadResult<UploadLinks> {
        info!(target: "uploader", file = %name, size, "Starting upload");

        if let Some(limit) = self.config.max_file_size {
            if size > limit {
                warn!(target: "uploader", file = %name, size, limit, "File exceeds size limit");
                return Err(UploadError::FileTooLarge { size, limit });
            }
        }

        let result = self.run(name, size, data, cancel).await;

        match &result {
            Ok(links) => info!(
                target: "uploader",
                file = %name,
                github_link = %links.github_link,
                "Upload completed successfully"
            ),
            Err(UploadError::Cancelled) => info!(target: "uploader", file = %name, "Upload cancelled"),
            Err(e) => error!(target: "uploader", file = %name, error = %e, "Upload failed"),
        }

        result
    }

    async fn run(
        &self,
        name: &str,
        size: u64,
        data: Bytes,
        cancel: &CancellationToken,
    ) -> UploadResult<UploadLinks> {
        let repository_id = until_cancelled(cancel, self.gh_client.repository_id()).await?;

        let content_type = mime::content_type_for(name);
        let request = UploadPolicyRequest {
            repository_id,
            name: name.to_string(),
            size,
            content_type: content_type.clone(),
        };
        let policy = until_cancelled(cancel, self.gh_client.create_upload_policy(&request)).await?;

        let boundary = multipart::generate_boundary();
        let file = FilePart {
            file_name: name.to_string(),
            content_type,
            data,
        };
        let body = multipart::build_body(&boundary, &policy.form_fields(), &file);

        let aws_link = until_cancelled(
            cancel,
            storage::post_form(
                self.gh_client.http_client(),
                &policy.upload_url,
                &policy.header,
                &boundary,
                body,
            ),
        )
        .await?;

        match until_cancelled(cancel, self.gh_client.complete_asset_upload(&policy)).await {
            Ok(()) => debug!(target: "uploader", asset_id = policy.asset.id, "Asset finalized"),
            Err(UploadError::Cancelled) => return Err(UploadError::Cancelled),
            Err(e) => warn!(
                target: "uploader",
                asset_id = policy.asset.id,
                error = %e,
                "Failed to finalize asset, link is still usable"
            ),
        }

        Ok(UploadLinks {
            github_link: policy.asset.href,
            aws_link,
        })
    }
}

/// Race `fut` against `cancel`; the request future is dropped on cancel,
/// which closes its connection
async fn until_cancelled<F, T, E>(cancel: &CancellationToken, fut: F) -> UploadResult<T>
where
    F: Future<Output = Result<T, E>>,
    UploadError: From<E>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(UploadError::Cancelled),
        result = fut => result.map_err(UploadError::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_serialize_camel_case() {
        let links = UploadLinks {
            github_link: "https://x/assets/1".to_string(),
            aws_link: "https://s3/y".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&links).unwrap(),
            r#"{"githubLink":"https://x/assets/1","awsLink":"https://s3/y"}"#
        );
    }

    #[tokio::test]
    async fn test_until_cancelled_prefers_cancel() {
        let token = CancellationToken::new();
        token.cancel();
        let result: UploadResult<()> =
            until_cancelled(&token, async { Ok::<(), UploadError>(()) }).await;
        assert!(matches!(result, Err(UploadError::Cancelled)));
    }
}
