//! # ocean-actions
//!
//! Querying and waiting on the platform's asynchronous actions.
//!
//! This crate provides:
//!
//! - [`Action`] - Read-only snapshot of one remote job
//! - [`FilterCriteria`] - Validated listing filters built at the command boundary
//! - [`query_actions`] - Filter plus stable sort by completion time
//! - [`ActionWaiter`] - Polls until an action leaves `in-progress`
//! - [`ActionService`] - Fetch seam implemented by the API client
//!
//! ## Example
//!
//! ```rust
//! use ocean_actions::{FilterCriteria, query_actions};
//!
//! let criteria = FilterCriteria::builder()
//!     .region("nyc3")
//!     .before("2020-01-01T00:00:00Z")
//!     .build()
//!     .expect("valid criteria");
//!
//! let listing = query_actions(&[], &criteria);
//! assert!(listing.is_empty());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod filter;
pub mod types;
pub mod wait;

pub use error::{ActionError, FetchFailure, Result, WaitError};
pub use filter::{
    CompletionWindow, FilterCriteria, FilterCriteriaBuilder, filter_actions, query_actions,
    sort_by_completed_at,
};
pub use types::{Action, ActionId, STATUS_IN_PROGRESS};
pub use wait::{ActionService, ActionWaiter, RetryPolicy, Sleeper, TokioSleeper, WaitPolicy};
