//! Per-upload entries for the user's log note

use chrono::{DateTime, Utc};

/// One logged upload
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub uploaded_at: DateTime<Utc>,
    pub name: String,
    pub size: u64,
    pub github_link: String,
    pub aws_link: String,
}

impl AuditEntry {
    /// Markdown bullet appended to the log note
    pub fn to_markdown(&self) -> String {
        let mut line = format!(
            "- {} `{}` ({}) → {}",
            self.uploaded_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.name,
            format_bytes(self.size),
            self.github_link
        );
        if !self.aws_link.is_empty() {
            line.push_str(&format!(" ([storage]({}))", self.aws_link));
        }
        line.push('\n');
        line
    }
}

/// Format bytes into human-readable string (e.g., "10.5 MB")
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(aws_link: &str) -> AuditEntry {
        AuditEntry {
            uploaded_at: Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 5).unwrap(),
            name: "a.png".to_string(),
            size: 1536,
            github_link: "https://x/assets/1".to_string(),
            aws_link: aws_link.to_string(),
        }
    }

    #[test]
    fn test_markdown_line() {
        assert_eq!(
            entry("https://s3/y").to_markdown(),
            "- 2026-03-01 12:30:05 UTC `a.png` (1.50 KB) → https://x/assets/1 ([storage](https://s3/y))\n"
        );
    }

    #[test]
    fn test_markdown_without_storage_link() {
        assert!(!entry("").to_markdown().contains("storage"));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(10), "10 B");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.00 MB");
    }
}
