pub mod audit;
pub mod config;
pub mod host;
pub mod logging;
pub mod markdown;
pub mod plugin;
pub mod uploader;

// Re-export commonly used types
pub use config::{ConfigManager, JsonFileStore, PluginSettings, SettingsStore};
pub use host::Host;
pub use logging::{LogConfig, LogGuard};
pub use plugin::{AttachPlugin, FileOutcome, FileReport, LocalFile};
pub use uploader::{UploadError, UploadLinks, UploadResult, Uploader, UploaderConfig};
