//! Error types for action queries and waits.

use std::error::Error as StdError;

use thiserror::Error;

use crate::types::ActionId;

/// Errors raised while building queries or wait policies.
#[derive(Debug, Error)]
pub enum ActionError {
    /// A `before`/`after` bound was not an RFC 3339 timestamp.
    #[error("invalid {field} timestamp {value:?}: {source}")]
    InvalidTimestamp {
        /// Name of the offending bound.
        field: &'static str,
        /// The raw value supplied.
        value: String,
        /// Underlying parse failure.
        #[source]
        source: chrono::ParseError,
    },

    /// The poll interval was zero.
    #[error("poll interval must be a positive number of seconds, got {0}")]
    InvalidPollInterval(u64),
}

/// Result type alias for action queries.
pub type Result<T> = std::result::Result<T, ActionError>;

/// Classification hook for errors returned by an [`crate::ActionService`].
///
/// The waiter retries errors that report themselves as transient and gives
/// up immediately on everything else.
pub trait FetchFailure: StdError + Send + Sync + 'static {
    /// Returns true if retrying the same fetch may succeed.
    fn is_transient(&self) -> bool {
        false
    }
}

/// Errors that end a wait.
#[derive(Debug, Error)]
pub enum WaitError<E: StdError + 'static> {
    /// Fetching the action failed and was not retried further.
    #[error(transparent)]
    Fetch(E),

    /// The caller cancelled the wait.
    #[error("wait for action {0} cancelled")]
    Cancelled(ActionId),

    /// The configured deadline passed before the action finished.
    #[error("action {id} still in progress after {waited_secs}s")]
    DeadlineExceeded {
        /// Action being waited on.
        id: ActionId,
        /// Configured deadline in seconds.
        waited_secs: u64,
    },
}
