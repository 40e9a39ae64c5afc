//! Link text written into notes

use crate::uploader::mime;
use uuid::Uuid;

/// `![alt](link)` embed for an uploaded file
pub fn image_embed(name: &str, link: &str) -> String {
    let alt: String = name.chars().filter(|c| *c != '[' && *c != ']').collect();
    format!("![{}]({})", alt, link)
}

/// Wiki-style embed the editor inserts for a local attachment
pub fn local_embed(name: &str) -> String {
    format!("![[{}]]", name)
}

/// Text shown while `name` is uploading
///
/// `token` tells apart concurrent uploads of files with the same name.
pub fn uploading_placeholder(name: &str, token: &str) -> String {
    format!("![Uploading {}… #{}]()", name, token)
}

/// Short random token for [`uploading_placeholder`]
pub fn placeholder_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(8);
    token
}

/// Whether the file is handled by the uploader at all
pub fn is_image(name: &str) -> bool {
    mime::content_type_for(name).starts_with("image/")
}

/// Replace the first occurrence of `original`; `None` if it is absent
pub fn replace_first(text: &str, original: &str, replacement: &str) -> Option<String> {
    if original.is_empty() {
        return None;
    }
    let start = text.find(original)?;
    let mut out = String::with_capacity(text.len() - original.len() + replacement.len());
    out.push_str(&text[..start]);
    out.push_str(replacement);
    out.push_str(&text[start + original.len()..]);
    Some(out)
}
