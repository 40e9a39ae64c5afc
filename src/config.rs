use anyhow::{Context, Result};
use github_attachments::{ApiError, BrowserSession, ClientConfig, RepositoryRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, RwLock};

use crate::uploader::UploaderConfig;

/// Repository used when the user has not picked one
///
/// No id is recorded for it, so its id is looked up once per client unless
/// `repositoryId` is set.
pub const DEFAULT_REPOSITORY: &str = "community/community";
/// Settings key under which the plugin stores its JSON blob
pub const SETTINGS_KEY: &str = "gh-attach";

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Plugin settings as persisted by the host
#[derive(Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginSettings {
    /// Value of the browser's `user_session` cookie
    pub session_cookie: String,
    /// `owner/name` of the repository attachments are filed under
    pub repository: String,
    /// Known id of `repository`, skips the lookup
    pub repository_id: Option<u64>,
    /// Delete the local file once its link is in the note
    pub delete_local_after_upload: bool,
    /// Append an entry per upload to `log_note_path`
    pub log_uploads: bool,
    /// Note receiving the upload log
    pub log_note_path: String,
    /// Show UI notices for successes and failures
    pub show_notices: bool,
    /// Attachment size limit in MiB
    pub max_file_size_mb: u64,
    pub log_level: LogLevel,
}

impl Default for PluginSettings {
    fn default() -> Self {
        Self {
            session_cookie: String::new(),
            repository: DEFAULT_REPOSITORY.to_string(),
            repository_id: None,
            delete_local_after_upload: false,
            log_uploads: false,
            log_note_path: "Uploads log.md".to_string(),
            show_notices: true,
            max_file_size_mb: 25,
            log_level: LogLevel::Info,
        }
    }
}

impl fmt::Debug for PluginSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginSettings")
            .field("session_cookie", &"<redacted>")
            .field("repository", &self.repository)
            .field("repository_id", &self.repository_id)
            .field("delete_local_after_upload", &self.delete_local_after_upload)
            .field("log_uploads", &self.log_uploads)
            .field("log_note_path", &self.log_note_path)
            .field("show_notices", &self.show_notices)
            .field("max_file_size_mb", &self.max_file_size_mb)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl PluginSettings {
    /// GitHub client configuration for these settings
    ///
    /// A pre-known id only applies to the repository it was recorded for.
    pub fn client_config(&self) -> Result<ClientConfig, ApiError> {
        let repository: RepositoryRef = self.repository.parse()?;
        Ok(ClientConfig::new(repository).with_repository_id(self.repository_id))
    }

    /// Session built from the stored cookie
    pub fn session(&self) -> Result<BrowserSession, ApiError> {
        BrowserSession::new(self.session_cookie.clone())
    }

    pub fn uploader_config(&self) -> UploaderConfig {
        UploaderConfig {
            max_file_size: (self.max_file_size_mb > 0)
                .then(|| self.max_file_size_mb.saturating_mul(1024 * 1024)),
        }
    }
}

/// The host's generic key-value settings store
pub trait SettingsStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// Settings store backed by one JSON object on disk
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Store at `~/.gh-attach/settings.json`
    pub fn default_location() -> Result<Self> {
        let home_dir = dirs::home_dir().context("Failed to get user home directory")?;
        Ok(Self::new(home_dir.join(".gh-attach").join("settings.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<serde_json::Map<String, serde_json::Value>> {
        if !self.path.exists() {
            return Ok(serde_json::Map::new());
        }
        let content = fs::read_to_string(&self.path).context("Failed to read settings file")?;
        serde_json::from_str(&content).context("Failed to parse settings file")
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let all = self.read_all()?;
        Ok(all.get(key).map(|v| v.to_string()))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to acquire settings file lock: {}", e))?;

        let mut all = self.read_all()?;
        let value: serde_json::Value =
            serde_json::from_str(value).context("Settings value is not JSON")?;
        all.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create settings directory")?;
            }
        }

        let content = serde_json::to_string_pretty(&all).context("Failed to serialize settings")?;
        fs::write(&self.path, content).context("Failed to write settings file")?;
        Ok(())
    }
}

/// Thread-safe settings manager that persists through a [`SettingsStore`]
pub struct ConfigManager<S: SettingsStore> {
    settings: RwLock<PluginSettings>,
    store: S,
}

impl<S: SettingsStore> ConfigManager<S> {
    /// Load settings from `store`, using defaults for missing fields
    pub fn load(store: S) -> Result<Self> {
        let settings = match store.load(SETTINGS_KEY)? {
            Some(raw) => {
                // serde's #[serde(default)] handles missing fields automatically
                let settings: PluginSettings =
                    serde_json::from_str(&raw).context("Failed to parse plugin settings")?;
                tracing::info!(target: "config", "Loaded plugin settings");
                settings
            }
            None => {
                tracing::info!(target: "config", "No stored settings, using defaults");
                PluginSettings::default()
            }
        };

        Ok(Self {
            settings: RwLock::new(settings),
            store,
        })
    }

    fn save(&self) -> Result<()> {
        let settings = self
            .settings
            .read()
            .map_err(|e| anyhow::anyhow!("Failed to acquire read lock on settings: {}", e))?;

        let content = serde_json::to_string(&*settings).context("Failed to serialize settings")?;
        self.store.save(SETTINGS_KEY, &content)?;

        tracing::debug!(target: "config", "Plugin settings saved");
        Ok(())
    }

    /// Get the current settings (cloned)
    pub fn get_settings(&self) -> PluginSettings {
        self.settings
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Update the settings with a closure and persist them
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut PluginSettings),
    {
        {
            let mut settings = self
                .settings
                .write()
                .map_err(|e| anyhow::anyhow!("Failed to acquire write lock on settings: {}", e))?;
            f(&mut settings);
        }
        self.save()
    }

    /// Store a new session cookie
    pub fn set_session_cookie(&self, cookie: impl Into<String>) -> Result<()> {
        let cookie = cookie.into();
        self.update(|s| s.session_cookie = cookie.trim().to_string())
    }

    /// Switch repository; a recorded id for the old one no longer applies
    pub fn set_repository(&self, repository: impl Into<String>, id: Option<u64>) -> Result<()> {
        let repository = repository.into();
        self.update(|s| {
            s.repository = repository;
            s.repository_id = id;
        })
    }

    pub fn delete_local_after_upload(&self) -> bool {
        self.settings
            .read()
            .map(|s| s.delete_local_after_upload)
            .unwrap_or(false)
    }

    pub fn set_delete_local_after_upload(&self, enabled: bool) -> Result<()> {
        self.update(|s| s.delete_local_after_upload = enabled)
    }

    pub fn log_uploads(&self) -> bool {
        self.settings.read().map(|s| s.log_uploads).unwrap_or(false)
    }

    /// Enable the upload log, writing into `note_path`
    pub fn set_log_uploads(&self, enabled: bool, note_path: Option<String>) -> Result<()> {
        self.update(|s| {
            s.log_uploads = enabled;
            if let Some(path) = note_path {
                s.log_note_path = path;
            }
        })
    }

    pub fn show_notices(&self) -> bool {
        self.settings.read().map(|s| s.show_notices).unwrap_or(true)
    }

    pub fn set_show_notices(&self, enabled: bool) -> Result<()> {
        self.update(|s| s.show_notices = enabled)
    }

    pub fn log_level(&self) -> LogLevel {
        self.settings
            .read()
            .map(|s| s.log_level)
            .unwrap_or(LogLevel::Info)
    }
}
