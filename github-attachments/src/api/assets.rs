use crate::client::{Client, RequestOptions};
use crate::error::{ApiError, ApiResult};
use crate::models::{Repository, UploadPolicy, UploadPolicyRequest};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use tracing::{debug, warn};

const POLICY_PATH: &str = "/upload/policies/assets";

/// Attachment upload API methods
#[async_trait]
pub trait AssetsApi {
    /// Resolve the configured repository's numeric id, cached after the
    /// first success
    async fn repository_id(&self) -> ApiResult<u64>;

    /// Request a fresh upload policy for one file
    async fn create_upload_policy(&self, request: &UploadPolicyRequest) -> ApiResult<UploadPolicy>;

    /// Tell GitHub the storage upload finished so it finalizes the asset
    async fn complete_asset_upload(&self, policy: &UploadPolicy) -> ApiResult<()>;
}

#[async_trait]
impl AssetsApi for Client {
    async fn repository_id(&self) -> ApiResult<u64> {
        if let Some(id) = self.cached_repository_id().await {
            return Ok(id);
        }

        let repository = self.config.repository.to_string();
        let resolution_error = |message: String| ApiError::RepoResolution {
            repository: repository.clone(),
            message,
        };

        let url = self.build_api_url(&format!(
            "/repos/{}/{}",
            self.config.repository.owner, self.config.repository.name
        ))?;

        debug!(target: "api::assets", repository = %repository, "Resolving repository id");

        // Public endpoint, no session cookie
        let response = self
            .request(Method::GET, url, RequestOptions::new().no_credential())
            .send()
            .await
            .map_err(|e| resolution_error(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(resolution_error(format!("HTTP {}: {}", status, body)));
        }

        let repo: Repository = response
            .json()
            .await
            .map_err(|e| resolution_error(e.to_string()))?;
        let id = repo
            .id
            .ok_or_else(|| resolution_error("response has no id".to_string()))?;

        self.cache_repository_id(id).await;
        debug!(target: "api::assets", repository = %repository, id, "Repository id resolved");

        Ok(id)
    }

    async fn create_upload_policy(&self, request: &UploadPolicyRequest) -> ApiResult<UploadPolicy> {
        let url = self.build_web_url(POLICY_PATH)?;

        debug!(
            target: "api::assets",
            name = %request.name,
            size = request.size,
            content_type = %request.content_type,
            "Requesting upload policy"
        );

        let response = self
            .request(Method::POST, url, RequestOptions::new())
            .form(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            warn!(
                target: "api::assets",
                status = status.as_u16(),
                "Upload policy request rejected"
            );
            return Err(ApiError::SessionExpired {
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        let policy: UploadPolicy = serde_json::from_str(&text)?;

        debug!(
            target: "api::assets",
            asset_id = policy.asset.id,
            fields = policy.form.len(),
            "Upload policy granted"
        );

        Ok(policy)
    }

    async fn complete_asset_upload(&self, policy: &UploadPolicy) -> ApiResult<()> {
        let url = self.build_web_url(&policy.asset_upload_url)?;

        debug!(target: "api::assets", asset_id = policy.asset.id, "Completing asset upload");

        let response = self
            .request(Method::PUT, url, RequestOptions::new())
            .form(&[(
                "authenticity_token",
                policy.asset_upload_authenticity_token.as_str(),
            )])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(ApiError::Completion { status, message });
        }

        Ok(())
    }
}
