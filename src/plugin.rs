//! Drop and paste handling
//!
//! Each dropped or pasted image gets a placeholder in the note, is uploaded,
//! and the placeholder is swapped for the remote embed. A failed upload puts
//! the original reference back and keeps the local file.

use crate::audit::AuditEntry;
use crate::config::{ConfigManager, SettingsStore};
use crate::host::Host;
use crate::markdown;
use crate::uploader::{UploadError, UploadLinks, UploadResult, Uploader};
use bytes::Bytes;
use chrono::Utc;
use futures::future::join_all;
use github_attachments::Client as GhClient;
use std::sync::{Arc, Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A file the editor just attached to the note
#[derive(Debug, Clone)]
pub struct LocalFile {
    pub name: String,
    /// Vault path of the local copy
    pub path: String,
    /// Text the editor inserted for it
    pub reference: String,
    pub data: Bytes,
}

impl LocalFile {
    /// File referenced with the editor's default `![[name]]` embed
    pub fn new(name: impl Into<String>, path: impl Into<String>, data: Bytes) -> Self {
        let name = name.into();
        Self {
            reference: markdown::local_embed(&name),
            name,
            path: path.into(),
            data,
        }
    }
}

#[derive(Debug)]
pub enum FileOutcome {
    Uploaded(UploadLinks),
    /// Not an image, left to the editor
    Skipped,
    Failed(UploadError),
}

#[derive(Debug)]
pub struct FileReport {
    pub name: String,
    pub outcome: FileOutcome,
}

/// Plugin core shared by every event handler
pub struct AttachPlugin<H: Host, S: SettingsStore> {
    config: ConfigManager<S>,
    host: Arc<H>,
    uploader: RwLock<Option<Arc<Uploader>>>,
    cancel_token: Mutex<CancellationToken>,
}

impl<H: Host, S: SettingsStore> AttachPlugin<H, S> {
    /// Create the plugin; the uploader is built from settings on first use
    pub fn new(config: ConfigManager<S>, host: Arc<H>) -> Self {
        Self {
            config,
            host,
            uploader: RwLock::new(None),
            cancel_token: Mutex::new(CancellationToken::new()),
        }
    }

    /// Create the plugin around an existing uploader
    pub fn with_uploader(config: ConfigManager<S>, host: Arc<H>, uploader: Arc<Uploader>) -> Self {
        let plugin = Self::new(config, host);
        plugin.install(uploader);
        plugin
    }

    pub fn config(&self) -> &ConfigManager<S> {
        &self.config
    }

    /// Rebuild the uploader after settings changed
    pub fn reload(&self) -> UploadResult<()> {
        self.install(self.build_uploader()?);
        info!(target: "plugin", "Uploader rebuilt from settings");
        Ok(())
    }

    fn install(&self, uploader: Arc<Uploader>) {
        let mut slot = match self.uploader.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = Some(uploader);
    }

    fn build_uploader(&self) -> UploadResult<Arc<Uploader>> {
        let settings = self.config.get_settings();
        let session = settings.session()?;
        let client = GhClient::new(settings.client_config()?, Arc::new(session))?;
        Ok(Arc::new(Uploader::new(
            Arc::new(client),
            settings.uploader_config(),
        )))
    }

    fn current_uploader(&self) -> UploadResult<Arc<Uploader>> {
        let existing = self.uploader.read().ok().and_then(|slot| slot.clone());
        match existing {
            Some(uploader) => Ok(uploader),
            None => {
                let uploader = self.build_uploader()?;
                self.install(uploader.clone());
                Ok(uploader)
            }
        }
    }

    fn current_token(&self) -> CancellationToken {
        match self.cancel_token.lock() {
            Ok(token) => token.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Abort every in-flight upload; later uploads start with a fresh token
    pub fn cancel_all(&self) {
        let mut token = match self.cancel_token.lock() {
            Ok(token) => token,
            Err(poisoned) => poisoned.into_inner(),
        };
        token.cancel();
        *token = CancellationToken::new();
        info!(target: "plugin", "Cancelled in-flight uploads");
    }

    /// Upload raw bytes and return the resulting links
    pub async fn upload_file(&self, name: &str, size: u64, data: Bytes) -> UploadResult<UploadLinks> {
        let uploader = self.current_uploader()?;
        let token = self.current_token();
        uploader.upload_with_cancel(name, size, data, &token).await
    }

    /// Handle files dropped or pasted into the active note
    pub async fn handle_files(&self, files: Vec<LocalFile>) -> Vec<FileReport> {
        join_all(files.into_iter().map(|file| self.handle_file(file))).await
    }

    async fn handle_file(&self, file: LocalFile) -> FileReport {
        let name = file.name.clone();
        let outcome = if markdown::is_image(&file.name) {
            self.process(file).await
        } else {
            debug!(target: "plugin", name = %file.name, "Not an image, leaving to the editor");
            FileOutcome::Skipped
        };
        FileReport { name, outcome }
    }

    async fn process(&self, file: LocalFile) -> FileOutcome {
        let settings = self.config.get_settings();
        let placeholder = markdown::uploading_placeholder(&file.name, &markdown::placeholder_token());

        let marker = match self.host.replace_text(&file.reference, &placeholder).await {
            Ok(()) => placeholder,
            Err(e) => {
                warn!(target: "plugin", name = %file.name, error = %e, "Failed to insert placeholder");
                file.reference.clone()
            }
        };

        let size = file.data.len() as u64;
        let links = match self.upload_file(&file.name, size, file.data.clone()).await {
            Ok(links) => links,
            Err(e) => {
                if marker != file.reference {
                    if let Err(revert) = self.host.replace_text(&marker, &file.reference).await {
                        warn!(target: "plugin", name = %file.name, error = %revert, "Failed to restore local reference");
                    }
                }
                // Session problems need user action even with notices off
                if settings.show_notices || e.requires_new_session() {
                    self.host.notice(&e.user_message(&file.name));
                }
                return FileOutcome::Failed(e);
            }
        };

        let embed = markdown::image_embed(&file.name, &links.github_link);
        let rewritten = match self.host.replace_text(&marker, &embed).await {
            Ok(()) => true,
            Err(e) => {
                warn!(target: "plugin", name = %file.name, error = %e, "Failed to write link into note");
                self.host.notice(&format!(
                    "Uploaded {} but could not update the note: {}",
                    file.name, links.github_link
                ));
                false
            }
        };

        if rewritten && settings.delete_local_after_upload {
            match self.host.delete_local(&file.path).await {
                Ok(()) => debug!(target: "plugin", path = %file.path, "Deleted local copy"),
                Err(e) => warn!(target: "plugin", path = %file.path, error = %e, "Failed to delete local copy"),
            }
        }

        if settings.log_uploads {
            let entry = AuditEntry {
                uploaded_at: Utc::now(),
                name: file.name.clone(),
                size,
                github_link: links.github_link.clone(),
                aws_link: links.aws_link.clone(),
            };
            if let Err(e) = self
                .host
                .append_to_note(&settings.log_note_path, &entry.to_markdown())
                .await
            {
                warn!(target: "plugin", note = %settings.log_note_path, error = %e, "Failed to write upload log");
            }
        }

        if settings.show_notices && rewritten {
            self.host.notice(&format!("Uploaded {}", file.name));
        }

        FileOutcome::Uploaded(links)
    }
}
