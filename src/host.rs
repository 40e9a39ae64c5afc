//! Effects the plugin needs from the note editor

use anyhow::Result;
use async_trait::async_trait;

/// The note editor embedding the plugin
///
/// Implemented by the host bridge; every method is a thin call into the
/// editor's own API.
#[async_trait]
pub trait Host: Send + Sync {
    /// Replace the first occurrence of `original` in the active note
    async fn replace_text(&self, original: &str, replacement: &str) -> Result<()>;

    /// Show a transient UI notice
    fn notice(&self, message: &str);

    /// Append `text` to the note at `path`, creating it if needed
    async fn append_to_note(&self, path: &str, text: &str) -> Result<()>;

    /// Remove the local attachment a note referenced
    async fn delete_local(&self, reference: &str) -> Result<()>;
}
