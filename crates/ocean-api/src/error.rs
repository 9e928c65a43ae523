//! Error types for API calls.

use http::StatusCode;
use ocean_actions::FetchFailure;
use ocean_http::{HttpResponse, TransportError};
use serde::Deserialize;
use thiserror::Error;

/// Errors returned by [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// No access token was supplied.
    #[error("access token is required. (hint: export OCEAN_ACCESS_TOKEN or pass --access-token)")]
    MissingToken,

    /// The client could not be configured.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request did not produce a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The API answered with a non-success status.
    #[error("{status}: {message}{}", id_suffix(id))]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Machine-readable error id, e.g. `not_found`.
        id: String,
        /// Human-readable description.
        message: String,
        /// Request id echoed by the API, when present.
        request_id: Option<String>,
    },

    /// The response body was not the expected JSON.
    #[error("decoding response: {0}")]
    Decode(#[from] serde_json::Error),
}

fn id_suffix(id: &str) -> String {
    if id.is_empty() {
        String::new()
    } else {
        format!(" (id: {id})")
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    id: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    request_id: Option<String>,
}

impl ApiError {
    /// Builds a [`ApiError::Status`] from a non-success response.
    ///
    /// The provider's JSON error body is used when it parses; otherwise the
    /// raw body (or the status reason) becomes the message.
    pub fn from_response(response: &HttpResponse) -> Self {
        let status = response.status();
        let body = serde_json::from_slice::<ErrorBody>(response.body()).unwrap_or_default();

        let message = if body.message.is_empty() {
            let raw = String::from_utf8_lossy(response.body()).trim().to_string();
            if raw.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                raw
            }
        } else {
            body.message
        };

        Self::Status {
            status,
            id: body.id,
            message,
            request_id: body.request_id,
        }
    }

    /// Returns true for failures worth retrying: connection problems,
    /// timeouts, rate limiting and server errors.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(err) => err.is_transient(),
            Self::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Self::MissingToken | Self::Config(_) | Self::Decode(_) => false,
        }
    }
}

impl FetchFailure for ApiError {
    fn is_transient(&self) -> bool {
        Self::is_transient(self)
    }
}

/// Result type alias for API calls.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use test_case::test_case;

    fn response(status: u16, body: &'static str) -> HttpResponse {
        http::Response::builder()
            .status(status)
            .body(Bytes::from_static(body.as_bytes()))
            .expect("response")
    }

    #[test]
    fn status_error_uses_provider_error_body() {
        let err = ApiError::from_response(&response(
            404,
            r#"{"id":"not_found","message":"The resource you were accessing could not be found.","request_id":"abc"}"#,
        ));

        let ApiError::Status {
            status,
            id,
            message,
            request_id,
        } = &err
        else {
            panic!("expected status error, got {err:?}");
        };
        assert_eq!(*status, StatusCode::NOT_FOUND);
        assert_eq!(id, "not_found");
        assert_eq!(message, "The resource you were accessing could not be found.");
        assert_eq!(request_id.as_deref(), Some("abc"));
        assert_eq!(
            err.to_string(),
            "404 Not Found: The resource you were accessing could not be found. (id: not_found)"
        );
    }

    #[test]
    fn status_error_falls_back_to_raw_body() {
        let err = ApiError::from_response(&response(502, "bad gateway\n"));
        assert!(matches!(err, ApiError::Status { ref message, .. } if message == "bad gateway"));
        assert_eq!(err.to_string(), "502 Bad Gateway: bad gateway");
    }

    #[test]
    fn status_error_without_id_omits_the_suffix() {
        let err = ApiError::from_response(&response(422, r#"{"message":"name is invalid"}"#));
        assert_eq!(err.to_string(), "422 Unprocessable Entity: name is invalid");
    }

    #[test]
    fn status_error_falls_back_to_reason() {
        let err = ApiError::from_response(&response(503, ""));
        assert!(
            matches!(err, ApiError::Status { ref message, .. } if message == "Service Unavailable")
        );
    }

    #[test]
    fn missing_token_message_has_hint() {
        assert_eq!(
            ApiError::MissingToken.to_string(),
            "access token is required. (hint: export OCEAN_ACCESS_TOKEN or pass --access-token)"
        );
    }

    #[test_case(429, true ; "rate limited")]
    #[test_case(500, true ; "internal error")]
    #[test_case(503, true ; "unavailable")]
    #[test_case(401, false ; "unauthorized")]
    #[test_case(404, false ; "not found")]
    fn status_transience(code: u16, transient: bool) {
        let err = ApiError::from_response(&response(code, ""));
        assert_eq!(err.is_transient(), transient);
        assert_eq!(FetchFailure::is_transient(&err), transient);
    }

    #[test]
    fn transport_transience_follows_transport_error() {
        assert!(ApiError::from(TransportError::Timeout("30s".into())).is_transient());
        assert!(!ApiError::from(TransportError::Request("bad".into())).is_transient());
        assert!(!ApiError::MissingToken.is_transient());
    }
}
