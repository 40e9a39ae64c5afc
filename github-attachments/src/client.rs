use crate::error::{ApiError, ApiResult};
use crate::session::SessionAuth;
use reqwest::header::{ACCEPT, ORIGIN};
use reqwest::{Client as HttpClient, Method, RequestBuilder, redirect};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

pub const DEFAULT_WEB_BASE_URL: &str = "https://github.com";
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// `owner/name` pair identifying a repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepositoryRef {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_matches('/');
        match trimmed.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(ApiError::InvalidRepository(s.to_string())),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Web origin that serves the upload endpoints (e.g., "https://github.com")
    pub web_base_url: String,
    /// REST API base used for repository metadata
    pub api_base_url: String,
    /// Repository the attachments are filed under
    pub repository: RepositoryRef,
    /// Pre-known repository id, skips one round trip
    pub repository_id: Option<u64>,
    /// Timeout for establishing connections in seconds
    pub timeout_seconds: u64,
    /// Browser user agent sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a new configuration for the given repository
    pub fn new(repository: RepositoryRef) -> Self {
        Self {
            web_base_url: DEFAULT_WEB_BASE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            repository,
            repository_id: None,
            timeout_seconds: 60,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_web_base_url(mut self, url: impl Into<String>) -> Self {
        self.web_base_url = url.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_repository_id(mut self, id: Option<u64>) -> Self {
        self.repository_id = id;
        self
    }

    /// Set the connect timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Request options for customizing calls to the web origin
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Don't include session credentials
    pub no_credential: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn no_credential(mut self) -> Self {
        self.no_credential = true;
        self
    }
}

/// GitHub attachments client
///
/// Safe to share across concurrent uploads. The only mutable state is the
/// resolved repository id, and every writer stores the same value.
pub struct Client {
    pub(crate) config: ClientConfig,
    pub(crate) http_client: HttpClient,
    session: Arc<dyn SessionAuth>,
    web_base: Url,
    api_base: Url,
    origin: String,
    repository_id: Arc<RwLock<Option<u64>>>,
}

impl Client {
    /// Create a new client
    pub fn new(config: ClientConfig, session: Arc<dyn SessionAuth>) -> ApiResult<Self> {
        let web_base = Url::parse(&config.web_base_url)?;
        let api_base = Url::parse(&config.api_base_url)?;
        let origin = web_base.origin().ascii_serialization();

        // Storage answers with a Location header that must be read, not followed
        let http_client = HttpClient::builder()
            .connect_timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .redirect(redirect::Policy::none())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            repository_id: Arc::new(RwLock::new(config.repository_id)),
            config,
            http_client,
            session,
            web_base,
            api_base,
            origin,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Underlying HTTP client, for direct-to-storage requests
    pub fn http_client(&self) -> &HttpClient {
        &self.http_client
    }

    /// Repository id if it has been resolved or was configured
    pub async fn cached_repository_id(&self) -> Option<u64> {
        *self.repository_id.read().await
    }

    pub(crate) async fn cache_repository_id(&self, id: u64) {
        let mut cached = self.repository_id.write().await;
        *cached = Some(id);
    }

    /// Resolve a path or absolute URL against the web origin
    pub fn build_web_url(&self, path: &str) -> ApiResult<Url> {
        Ok(self.web_base.join(path)?)
    }

    /// Resolve a path against the REST API base
    pub fn build_api_url(&self, path: &str) -> ApiResult<Url> {
        Ok(self.api_base.join(path)?)
    }

    /// Start a request to the web origin with browser headers and, unless
    /// opted out, the session credential
    pub(crate) fn request(&self, method: Method, url: Url, options: RequestOptions) -> RequestBuilder {
        let sends_body = method != Method::GET && method != Method::HEAD;
        let mut request = self
            .http_client
            .request(method, url)
            .header(ACCEPT, "application/json");

        if sends_body {
            request = request.header(ORIGIN, self.origin.as_str());
        }

        if !options.no_credential {
            request = self.session.authorize(request);
        }

        request
    }
}
