//! Concrete transports: reqwest-backed HTTP and bearer-token auth.

use std::fmt;
use std::time::Duration;

use http::header::AUTHORIZATION;
use http::HeaderValue;
use ocean_http::{HttpRequest, HttpResponse, Transport, TransportError};
use tracing::debug;

use crate::error::{ApiError, Result};

/// [`Transport`] that sends requests over the network with reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("building HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn round_trip(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        let (parts, body) = request.into_parts();
        debug!(method = %parts.method, uri = %parts.uri, "sending request");

        let response = self
            .client
            .request(parts.method, parts.uri.to_string())
            .headers(parts.headers)
            .body(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))?;
        debug!(%status, bytes = body.len(), "received response");

        let mut out = HttpResponse::new(body);
        *out.status_mut() = status;
        *out.version_mut() = version;
        *out.headers_mut() = headers;
        Ok(out)
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

/// Decorator that adds `Authorization: Bearer <token>` to every request.
pub struct BearerAuth<T> {
    inner: T,
    header: HeaderValue,
}

impl<T> BearerAuth<T> {
    /// Wraps `inner`.
    ///
    /// # Errors
    ///
    /// [`ApiError::Config`] if the token cannot be sent as a header.
    pub fn new(inner: T, token: &str) -> Result<Self> {
        let mut header = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|_| ApiError::Config("access token contains invalid characters".into()))?;
        header.set_sensitive(true);
        Ok(Self { inner, header })
    }

    /// Returns the wrapped transport.
    pub const fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: fmt::Debug> fmt::Debug for BearerAuth<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Transport for BearerAuth<T> {
    async fn round_trip(&self, mut request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        request
            .headers_mut()
            .insert(AUTHORIZATION, self.header.clone());
        self.inner.round_trip(request).await
    }
}
