use serde::{Deserialize, Serialize};

/// Subset of `GET /repos/{owner}/{repo}` that the uploader needs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    /// Missing on error bodies, which is reported as a resolution failure
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}
