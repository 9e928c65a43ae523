//! Core types for remote actions.
//!
//! An [`Action`] is a read-only snapshot of one asynchronous job tracked by
//! the platform. The client never mutates or caches them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status value reported while an action is still running.
pub const STATUS_IN_PROGRESS: &str = "in-progress";

/// Unique identifier for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub u64);

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ActionId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A snapshot of one asynchronous job performed by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Stable identifier.
    pub id: ActionId,
    /// Free-form status string (`in-progress`, `completed`, `errored`, ...).
    pub status: String,
    /// Operation kind, e.g. `create` or `power_off`.
    #[serde(rename = "type")]
    pub action_type: String,
    /// When the platform started the job.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// When the job finished. Absent while in progress.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// Identifier of the resource the job acted on.
    #[serde(default)]
    pub resource_id: Option<u64>,
    /// Kind of resource the job acted on, e.g. `droplet`.
    #[serde(default)]
    pub resource_type: String,
    /// Region the job ran in; empty for global resources.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub region_slug: String,
}

impl Action {
    /// Returns true while the platform still reports the job as running.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status == STATUS_IN_PROGRESS
    }

    /// Any status other than `in-progress` is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.is_in_progress()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
