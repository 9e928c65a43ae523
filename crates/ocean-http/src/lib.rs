//! # ocean-http
//!
//! HTTP transport seam for oceanctl, plus a tracing decorator that mirrors
//! every round trip onto bounded in-memory streams.
//!
//! This crate provides:
//!
//! - [`Transport`] - One request in, one response (or error) out
//! - [`Tracer`] - Decorator publishing request/response dumps with a shared [`TraceId`]
//! - [`trace_queue`] - Bounded queue with an explicit [`OverflowPolicy`]
//! - [`spawn_trace_logger`] - Consumer task that writes records through `tracing`
//!
//! ## Example
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use ocean_http::{spawn_trace_logger, TraceConfig, Tracer, Transport, TransportError};
//!
//! struct Offline;
//!
//! impl Transport for Offline {
//!     async fn round_trip(
//!         &self,
//!         _request: ocean_http::HttpRequest,
//!     ) -> Result<ocean_http::HttpResponse, TransportError> {
//!         Err(TransportError::Connect("offline".into()))
//!     }
//! }
//!
//! # async fn run() {
//! let (tracer, streams) = Tracer::new(Offline, &TraceConfig::default());
//! let logger = spawn_trace_logger(streams);
//!
//! let request = http::Request::get("https://api.example.com/v2/actions")
//!     .body(Bytes::new())
//!     .unwrap();
//! let _ = tracer.round_trip(request).await;
//!
//! drop(tracer);
//! logger.await.unwrap();
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dump;
pub mod error;
pub mod logger;
pub mod queue;
pub mod record;
pub mod tracer;
pub mod transport;

pub use dump::{dump_request, dump_response};
pub use error::{Result, TransportError};
pub use logger::{drain_traces, spawn_trace_logger};
pub use queue::{Delivery, OverflowPolicy, TraceConfig, TraceReceiver, TraceSender, trace_queue};
pub use record::{Direction, TraceId, TraceRecord};
pub use tracer::{TraceStreams, Tracer};
pub use transport::{HttpRequest, HttpResponse, Transport};
