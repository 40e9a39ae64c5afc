use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Form body for `POST /upload/policies/assets`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadPolicyRequest {
    pub repository_id: u64,
    pub name: String,
    pub size: u64,
    pub content_type: String,
}

/// Canonical asset record created by the policy request
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    pub size: u64,
    pub content_type: String,
    /// Permanent `user-attachments` link, embeddable in notes
    pub href: String,
    #[serde(default)]
    pub original_name: Option<String>,
}

/// Single-use upload authorization returned by the policy endpoint
///
/// Presigned fields in `form` are per file; a policy is never reused.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub upload_url: String,
    #[serde(default)]
    pub upload_authenticity_token: Option<String>,
    pub asset_upload_url: String,
    pub asset_upload_authenticity_token: String,
    pub asset: Asset,
    /// Fields echoed verbatim to storage, in server order
    #[serde(default)]
    pub form: Map<String, Value>,
    #[serde(default)]
    pub header: HashMap<String, String>,
    #[serde(default)]
    pub same_origin: bool,
}

impl UploadPolicy {
    /// Storage form fields as ordered name/value pairs.
    ///
    /// Non-string JSON values are sent as their JSON text.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.form
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICY: &str = r#"{
        "upload_url": "https://github-production-user-asset-6210df.s3.amazonaws.com",
        "header": {},
        "asset": {
            "id": 1234,
            "name": "a.png",
            "size": 10,
            "content_type": "image/png",
            "href": "https://github.com/user-attachments/assets/abcd",
            "original_name": "a.png"
        },
        "form": {
            "key": "1234/abcd",
            "acl": "private",
            "policy": "eyJ...",
            "X-Amz-Algorithm": "AWS4-HMAC-SHA256",
            "Content-Type": "image/png",
            "Cache-Control": "max-age=2592000",
            "x-amz-meta-Surrogate-Control": "max-age=31557600",
            "success_action_status": 201
        },
        "same_origin": false,
        "asset_upload_url": "/upload/assets/1234",
        "upload_authenticity_token": "upload-token",
        "asset_upload_authenticity_token": "asset-token"
    }"#;

    #[test]
    fn test_form_fields_keep_server_order() {
        let policy: UploadPolicy = serde_json::from_str(POLICY).unwrap();
        let keys: Vec<String> = policy.form_fields().into_iter().map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![
                "key",
                "acl",
                "policy",
                "X-Amz-Algorithm",
                "Content-Type",
                "Cache-Control",
                "x-amz-meta-Surrogate-Control",
                "success_action_status",
            ]
        );
    }

    #[test]
    fn test_non_string_form_values_rendered() {
        let policy: UploadPolicy = serde_json::from_str(POLICY).unwrap();
        let fields = policy.form_fields();
        assert_eq!(
            fields.last().unwrap(),
            &("success_action_status".to_string(), "201".to_string())
        );
        assert_eq!(policy.asset.href, "https://github.com/user-attachments/assets/abcd");
        assert!(!policy.same_origin);
    }
}
