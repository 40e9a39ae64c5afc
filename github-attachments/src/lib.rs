//! Client for the attachment upload endpoints GitHub's web UI uses.
//!
//! Requests to the web origin are authenticated with a captured browser
//! session cookie (see [`session`]); the public REST API is only used to
//! resolve a repository id.

pub mod api;
pub mod client;
pub mod error;
pub mod models;
pub mod session;

pub use client::{Client, ClientConfig, RepositoryRef, RequestOptions};
pub use error::{ApiError, ApiResult};
pub use session::{BrowserSession, SessionAuth};
