#![allow(dead_code)]

use anyhow::{Result, bail};
use async_trait::async_trait;
use gh_attach::markdown;
use gh_attach::{Host, SettingsStore, Uploader, UploaderConfig};
use github_attachments::{BrowserSession, Client, ClientConfig, RepositoryRef};
use mockito::{Mock, ServerGuard};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const SESSION: &str = "s3cret";
pub const COOKIE_HEADER: &str = "user_session=s3cret; __Host-user_session_same_site=s3cret";
pub const REPO_PATH: &str = "/repos/octo/notes";
pub const POLICY_PATH: &str = "/upload/policies/assets";
pub const STORAGE_PATH: &str = "/storage";
pub const COMPLETE_PATH: &str = "/upload/assets/1";
pub const GITHUB_LINK: &str = "https://x/assets/1";
pub const AWS_LINK: &str = "https://s3/y";

pub fn client_for(server: &ServerGuard) -> Arc<Client> {
    client_at(&server.url())
}

/// Client whose web and API origins are both `base_url`
pub fn client_at(base_url: &str) -> Arc<Client> {
    let config = ClientConfig::new(RepositoryRef::new("octo", "notes"))
        .with_web_base_url(base_url)
        .with_api_base_url(base_url);
    Arc::new(Client::new(config, Arc::new(BrowserSession::new(SESSION).unwrap())).unwrap())
}

pub fn uploader_for(server: &ServerGuard) -> Arc<Uploader> {
    Arc::new(Uploader::new(client_for(server), UploaderConfig::default()))
}

pub fn policy_body(server_url: &str) -> String {
    format!(
        r#"{{
            "upload_url": "{server_url}{STORAGE_PATH}",
            "header": {{}},
            "asset": {{
                "id": 1,
                "name": "a.png",
                "size": 10,
                "content_type": "image/png",
                "href": "{GITHUB_LINK}",
                "original_name": "a.png"
            }},
            "form": {{
                "key": "1/abcd",
                "acl": "private",
                "policy": "eyJleHBpcmF0aW9uIjoi",
                "X-Amz-Signature": "f00d"
            }},
            "same_origin": false,
            "asset_upload_url": "{COMPLETE_PATH}",
            "upload_authenticity_token": "ut",
            "asset_upload_authenticity_token": "at"
        }}"#
    )
}

pub async fn mock_repo(server: &mut ServerGuard, hits: usize) -> Mock {
    server
        .mock("GET", REPO_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id": 42, "full_name": "octo/notes"}"#)
        .expect(hits)
        .create_async()
        .await
}

pub async fn mock_policy(server: &mut ServerGuard, hits: usize) -> Mock {
    let body = policy_body(&server.url());
    server
        .mock("POST", POLICY_PATH)
        .match_header("cookie", COOKIE_HEADER)
        .with_status(201)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

pub async fn mock_storage(server: &mut ServerGuard, status: usize, hits: usize) -> Mock {
    server
        .mock("POST", STORAGE_PATH)
        .with_status(status)
        .with_header("location", AWS_LINK)
        .expect(hits)
        .create_async()
        .await
}

pub async fn mock_complete(server: &mut ServerGuard, status: usize, hits: usize) -> Mock {
    server
        .mock("PUT", COMPLETE_PATH)
        .match_header("cookie", COOKIE_HEADER)
        .with_status(status)
        .with_body("{}")
        .expect(hits)
        .create_async()
        .await
}

/// Settings kept in memory, as the host's key-value store would
#[derive(Default)]
pub struct MemoryStore(Mutex<HashMap<String, String>>);

impl SettingsStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.0.lock().unwrap().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.0
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Host that edits one in-memory note and records every side effect
#[derive(Default)]
pub struct RecordingHost {
    pub note: Mutex<String>,
    /// Every successful `replace_text` call as (original, replacement)
    pub edits: Mutex<Vec<(String, String)>>,
    pub notices: Mutex<Vec<String>>,
    pub appended: Mutex<Vec<(String, String)>>,
    pub deleted: Mutex<Vec<String>>,
}

impl RecordingHost {
    pub fn with_note(text: &str) -> Self {
        Self {
            note: Mutex::new(text.to_string()),
            ..Default::default()
        }
    }

    pub fn note(&self) -> String {
        self.note.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn replace_text(&self, original: &str, replacement: &str) -> Result<()> {
        let mut note = self.note.lock().unwrap();
        match markdown::replace_first(&note, original, replacement) {
            Some(updated) => {
                *note = updated;
                self.edits
                    .lock()
                    .unwrap()
                    .push((original.to_string(), replacement.to_string()));
                Ok(())
            }
            None => bail!("`{}` not found in note", original),
        }
    }

    fn notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }

    async fn append_to_note(&self, path: &str, text: &str) -> Result<()> {
        self.appended
            .lock()
            .unwrap()
            .push((path.to_string(), text.to_string()));
        Ok(())
    }

    async fn delete_local(&self, reference: &str) -> Result<()> {
        self.deleted.lock().unwrap().push(reference.to_string());
        Ok(())
    }
}
