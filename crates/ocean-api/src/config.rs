//! Client configuration.

use std::fmt;
use std::time::Duration;

use ocean_http::TraceConfig;
use url::Url;

use crate::error::{ApiError, Result};

/// Public API endpoint used when none is configured.
pub const DEFAULT_API_URL: &str = "https://api.digitalocean.com";

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything needed to build an [`crate::ApiClient`].
#[derive(Clone)]
pub struct ClientConfig {
    /// Bearer token sent with every request.
    pub access_token: String,
    /// Base URL of the API.
    pub api_url: String,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
    /// Enables request/response tracing when set.
    pub trace: Option<TraceConfig>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a config for `access_token` with default settings.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: default_user_agent(),
            trace: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Enables tracing.
    #[must_use]
    pub fn with_trace(mut self, trace: TraceConfig) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Checks the config and returns the base URL, normalized to end in `/`.
    ///
    /// # Errors
    ///
    /// [`ApiError::MissingToken`] for an empty token, [`ApiError::Config`]
    /// for a URL that does not parse or is not http(s).
    pub fn validate(&self) -> Result<Url> {
        if self.access_token.trim().is_empty() {
            return Err(ApiError::MissingToken);
        }

        let mut url = Url::parse(&self.api_url)
            .map_err(|e| ApiError::Config(format!("invalid API URL {:?}: {e}", self.api_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "invalid API URL {:?}: scheme must be http or https",
                self.api_url
            )));
        }
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("access_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("user_agent", &self.user_agent)
            .field("trace", &self.trace)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// `oceanctl/<version>`.
pub fn default_user_agent() -> String {
    format!("oceanctl/{}", env!("CARGO_PKG_VERSION"))
}
