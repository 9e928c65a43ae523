//! # ocean-api
//!
//! Authenticated JSON client for the cloud provider's REST API.
//!
//! Requests go through a layered [`ocean_http::Transport`] stack:
//! reqwest at the bottom, bearer-token auth above it, and optionally the
//! [`ocean_http::Tracer`] on top.
//!
//! ```rust,no_run
//! use ocean_actions::{ActionId, ActionService};
//! use ocean_api::{ApiClient, ClientConfig};
//!
//! # async fn run() -> Result<(), ocean_api::ApiError> {
//! let (client, _streams) = ApiClient::connect(&ClientConfig::new("my-token"))?;
//! let action = client.actions().get(ActionId(36_804_636)).await?;
//! println!("{} is {}", action.id, action.status);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod actions;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

pub use actions::{ActionsApi, PER_PAGE};
pub use client::{ApiClient, ClientTransport};
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_TIMEOUT, default_user_agent};
pub use error::{ApiError, Result};
pub use transport::{BearerAuth, HttpTransport};
