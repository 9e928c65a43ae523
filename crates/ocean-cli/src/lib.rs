//! # ocean-cli
//!
//! The `oceanctl` command-line interface.
//!
//! Provides commands for:
//! - Fetching a single action
//! - Listing actions with filters, ordered by completion time
//! - Waiting for an action to finish
//!
//! # Architecture
//!
//! Commands talk to the provider through [`ocean_api::ApiClient`]. With
//! `--trace` the client's transport publishes request and response dumps,
//! which a background task writes to stderr.
//!
//! ```text
//! ┌──────────┐   ActionService   ┌───────────┐   Transport   ┌──────────┐
//! │ oceanctl │──────────────────►│ ApiClient │──────────────►│ REST API │
//! └──────────┘                   └─────┬─────┘  (HTTPS)      └──────────┘
//!                                      │ TraceStreams
//!                                      ▼
//!                               trace logger task
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{ActionCommands, Cli, Commands, Format, ListArgs, TraceOverflow, WaitArgs};
pub use error::CliError;
pub use output::OutputFormat;
