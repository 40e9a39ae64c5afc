//! Session-cookie authentication for the GitHub web origin
//!
//! The attachment endpoints are not part of the public API. They accept a
//! request only when it carries the cookies of a logged-in browser tab and
//! the headers the web UI's `fetch` wrapper sends. All of that is kept behind
//! [`SessionAuth`] so the credential format can change without touching the
//! upload flow.

use crate::error::{ApiError, ApiResult};
use reqwest::RequestBuilder;
use reqwest::header::COOKIE;
use std::fmt;

/// Name of the primary session cookie
pub const SESSION_COOKIE: &str = "user_session";
/// Same-site twin of the session cookie; GitHub checks both
pub const SAME_SITE_COOKIE: &str = "__Host-user_session_same_site";

/// Adds credential-bearing headers to a request for the web origin
pub trait SessionAuth: Send + Sync {
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Session captured from a browser's `user_session` cookie
#[derive(Clone)]
pub struct BrowserSession {
    cookie: String,
}

impl BrowserSession {
    /// Wrap a captured cookie value. Surrounding whitespace (common when
    /// copying from devtools) is trimmed.
    pub fn new(cookie: impl Into<String>) -> ApiResult<Self> {
        let cookie = cookie.into().trim().to_string();
        if cookie.is_empty() {
            return Err(ApiError::MissingCredential);
        }
        Ok(Self { cookie })
    }

    fn cookie_header(&self) -> String {
        format!(
            "{}={}; {}={}",
            SESSION_COOKIE, self.cookie, SAME_SITE_COOKIE, self.cookie
        )
    }
}

impl SessionAuth for BrowserSession {
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(COOKIE, self.cookie_header())
            .header("X-Requested-With", "XMLHttpRequest")
            .header("GitHub-Verified-Fetch", "true")
    }
}

impl fmt::Debug for BrowserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserSession")
            .field("cookie", &"<redacted>")
            .finish()
    }
}
