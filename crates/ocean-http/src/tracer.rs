//! Transport decorator that mirrors every round trip onto trace streams.
//!
//! The tracer forwards each request to the wrapped transport untouched and
//! returns exactly what it returns. As a side effect it publishes a dump of
//! the request before the call and a dump of the response (or of the error)
//! after it, both tagged with the same [`TraceId`].
//!
//! If the request dump cannot be built the call is not made and the dump
//! error is returned instead. Response dumps cannot fail.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::trace;

use crate::dump::{dump_request, dump_response};
use crate::error::TransportError;
use crate::queue::{trace_queue, TraceConfig, TraceReceiver, TraceSender};
use crate::record::{Direction, TraceId, TraceRecord};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Receiving ends of a tracer's two streams.
#[derive(Debug)]
pub struct TraceStreams {
    /// Request dumps.
    pub requests: TraceReceiver,
    /// Response dumps.
    pub responses: TraceReceiver,
}

/// Tracing decorator around another [`Transport`].
#[derive(Debug)]
pub struct Tracer<T> {
    inner: T,
    next_id: AtomicU64,
    requests: TraceSender,
    responses: TraceSender,
}

impl<T: Transport> Tracer<T> {
    /// Wraps `inner` and returns the tracer with its two receiving streams.
    #[must_use]
    pub fn new(inner: T, config: &TraceConfig) -> (Self, TraceStreams) {
        let (requests, request_rx) = trace_queue(config);
        let (responses, response_rx) = trace_queue(config);

        let tracer = Self {
            inner,
            next_id: AtomicU64::new(1),
            requests,
            responses,
        };
        let streams = TraceStreams {
            requests: request_rx,
            responses: response_rx,
        };
        (tracer, streams)
    }

    /// Returns the wrapped transport.
    pub const fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Transport> Transport for Tracer<T> {
    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let id = TraceId(self.next_id.fetch_add(1, Ordering::Relaxed));

        let dump = dump_request(&request)?;
        let delivery = self
            .requests
            .send(TraceRecord::new(id, Direction::Request, dump))
            .await;
        trace!(trace_id = %id, ?delivery, "published request dump");

        let result = self.inner.round_trip(request).await;

        let dump = match &result {
            Ok(response) => dump_response(response),
            Err(err) => format!("transport error: {err}"),
        };
        let delivery = self
            .responses
            .send(TraceRecord::new(id, Direction::Response, dump))
            .await;
        trace!(trace_id = %id, ?delivery, "published response dump");

        result
    }
}
