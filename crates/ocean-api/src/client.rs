//! The API client and the transport stack it sends through.

use bytes::Bytes;
use http::header::{ACCEPT, USER_AGENT};
use http::HeaderValue;
use ocean_http::{HttpRequest, HttpResponse, TraceConfig, TraceStreams, Tracer, Transport, TransportError};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::actions::ActionsApi;
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::transport::{BearerAuth, HttpTransport};

/// The transport stack used by [`ApiClient`].
///
/// With tracing enabled the [`Tracer`] wraps the auth layer, so dumps show
/// the request as built by the client, without the bearer token.
#[derive(Debug)]
pub enum ClientTransport<T = HttpTransport> {
    /// Auth only.
    Direct(BearerAuth<T>),
    /// Tracing around auth.
    Traced(Tracer<BearerAuth<T>>),
}

impl<T: Transport> ClientTransport<T> {
    /// Layers auth, and tracing when `trace` is set, around `inner`.
    pub fn assemble(
        inner: T,
        access_token: &str,
        trace: Option<&TraceConfig>,
    ) -> Result<(Self, Option<TraceStreams>)> {
        let authed = BearerAuth::new(inner, access_token)?;
        Ok(match trace {
            Some(config) => {
                let (tracer, streams) = Tracer::new(authed, config);
                (Self::Traced(tracer), Some(streams))
            }
            None => (Self::Direct(authed), None),
        })
    }
}

impl<T: Transport> Transport for ClientTransport<T> {
    async fn round_trip(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
        match self {
            Self::Direct(transport) => transport.round_trip(request).await,
            Self::Traced(transport) => transport.round_trip(request).await,
        }
    }
}

/// JSON client for the provider's REST API.
#[derive(Debug)]
pub struct ApiClient<T = ClientTransport> {
    transport: T,
    base_url: Url,
    user_agent: HeaderValue,
}

impl ApiClient {
    /// Builds a networked client from `config`.
    ///
    /// Returns the trace streams when tracing is configured; the caller is
    /// expected to hand them to a consumer.
    pub fn connect(config: &ClientConfig) -> Result<(Self, Option<TraceStreams>)> {
        let base_url = config.validate()?;
        let http = HttpTransport::new(config.timeout)?;
        let (transport, streams) =
            ClientTransport::assemble(http, &config.access_token, config.trace.as_ref())?;

        debug!(%base_url, traced = streams.is_some(), "API client ready");
        let client = Self::with_transport(transport, base_url, &config.user_agent)?;
        Ok((client, streams))
    }
}

impl<T: Transport> ApiClient<T> {
    /// Builds a client over an arbitrary transport.
    pub fn with_transport(transport: T, base_url: Url, user_agent: &str) -> Result<Self> {
        let user_agent = HeaderValue::from_str(user_agent)
            .map_err(|_| ApiError::Config(format!("invalid user agent {user_agent:?}")))?;
        Ok(Self {
            transport,
            base_url,
            user_agent,
        })
    }

    /// Actions endpoints.
    pub const fn actions(&self) -> ActionsApi<'_, T> {
        ActionsApi::new(self)
    }

    /// The transport requests are sent through.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Base URL every path is resolved against.
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sends `GET <base>/<path>` and decodes the JSON body.
    ///
    /// `path` is relative (no leading `/`) and may carry a query string.
    ///
    /// # Errors
    ///
    /// [`ApiError::Status`] for a non-2xx response, [`ApiError::Decode`] if
    /// the body is not the expected JSON, [`ApiError::Transport`] if no
    /// response arrived.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Config(format!("invalid request path {path:?}: {e}")))?;

        let request = http::Request::get(url.as_str())
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, self.user_agent.clone())
            .body(Bytes::new())
            .map_err(|e| ApiError::Config(format!("building request for {url}: {e}")))?;

        let response = self.transport.round_trip(request).await?;
        if !response.status().is_success() {
            let err = ApiError::from_response(&response);
            debug!(%url, error = %err, "request rejected");
            return Err(err);
        }
        Ok(serde_json::from_slice(response.body())?)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    /// Transport answering from a path-and-query keyed table.
    #[derive(Default)]
    pub(crate) struct Routes {
        routes: Mutex<HashMap<String, Vec<(u16, String)>>>,
        pub(crate) seen: Mutex<Vec<HttpRequest>>,
    }

    impl Routes {
        /// Queues one response for `target`; repeated calls answer in order.
        pub(crate) fn on(self, target: &str, status: u16, body: impl Into<String>) -> Self {
            self.routes
                .lock()
                .entry(target.to_string())
                .or_default()
                .push((status, body.into()));
            self
        }

        pub(crate) fn targets(&self) -> Vec<String> {
            self.seen
                .lock()
                .iter()
                .map(|r| r.uri().path_and_query().map_or("/", |pq| pq.as_str()).to_string())
                .collect()
        }
    }

    impl Transport for Routes {
        async fn round_trip(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
            let target = request
                .uri()
                .path_and_query()
                .map_or("/", |pq| pq.as_str())
                .to_string();
            self.seen.lock().push(request);

            let mut routes = self.routes.lock();
            let queue = routes
                .get_mut(&target)
                .filter(|queue| !queue.is_empty())
                .ok_or_else(|| TransportError::Connect(format!("no route for {target}")))?;
            let (status, body) = queue.remove(0);
            Ok(http::Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Bytes::from(body))
                .expect("response"))
        }
    }

    pub(crate) fn client(routes: Routes) -> ApiClient<Routes> {
        let base = Url::parse("https://api.example.com/").expect("url");
        ApiClient::with_transport(routes, base, "oceanctl/test").expect("client")
    }
}
