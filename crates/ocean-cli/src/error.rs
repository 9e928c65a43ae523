//! CLI error types.

use ocean_actions::{ActionError, WaitError};
use ocean_api::ApiError;
use thiserror::Error;

/// Errors surfaced to the user by `oceanctl`.
#[derive(Debug, Error)]
pub enum CliError {
    /// An API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A filter or wait option was invalid.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Waiting on an action failed.
    #[error(transparent)]
    Wait(#[from] WaitError<ApiError>),

    /// Output could not be rendered.
    #[error("format error: {0}")]
    Format(String),

    /// A command-line argument was invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The command was interrupted before it finished.
    #[error("interrupted")]
    Interrupted,

    /// Writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
