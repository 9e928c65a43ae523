//! The transport seam every API call goes through.
//!
//! A [`Transport`] performs one HTTP round trip. Decorators such as
//! [`crate::Tracer`] wrap another transport and forward to it.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::TransportError;

/// Outgoing request with a fully buffered body.
pub type HttpRequest = http::Request<Bytes>;

/// Returned response with a fully buffered body.
pub type HttpResponse = http::Response<Bytes>;

/// Performs a single HTTP round trip.
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the server's response.
    ///
    /// Non-2xx statuses are responses, not errors.
    fn round_trip(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn round_trip(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send {
        (**self).round_trip(request)
    }
}
