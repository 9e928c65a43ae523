//! Filtering and ordering of action listings.
//!
//! [`FilterCriteria`] is built and validated once at the command boundary
//! and then passed by reference into the pure [`filter_actions`] function.
//!
//! Actions without a completion timestamp never appear in a filtered
//! listing, even when no criteria are set: an in-flight action has no place
//! in a completion-ordered view.

use chrono::{DateTime, Utc};

use crate::error::{ActionError, Result};
use crate::types::Action;

/// Completion-time window. Both bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompletionWindow {
    /// Reject actions completed before this instant.
    pub after: Option<DateTime<Utc>>,
    /// Reject actions completed after this instant.
    pub before: Option<DateTime<Utc>>,
}

impl CompletionWindow {
    /// Checks if a completion timestamp falls within this window.
    #[must_use]
    pub fn contains(&self, completed_at: DateTime<Utc>) -> bool {
        if let Some(after) = self.after {
            if completed_at < after {
                return false;
            }
        }
        if let Some(before) = self.before {
            if completed_at > before {
                return false;
            }
        }
        true
    }
}

/// Validated filter criteria for action listings.
///
/// Every criterion is optional; set criteria are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Exact resource type match.
    pub resource_type: Option<String>,
    /// Exact region slug match.
    pub region: Option<String>,
    /// Exact status match.
    pub status: Option<String>,
    /// Exact action type match.
    pub action_type: Option<String>,
    /// Completion time window.
    pub window: CompletionWindow,
}

impl FilterCriteria {
    /// Creates an empty criteria set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts building criteria from raw command-line strings.
    #[must_use]
    pub fn builder() -> FilterCriteriaBuilder {
        FilterCriteriaBuilder::default()
    }

    /// Returns true if no criterion is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks a single action against every criterion.
    #[must_use]
    pub fn matches(&self, action: &Action) -> bool {
        // Applies regardless of which criteria are set.
        let Some(completed_at) = action.completed_at else {
            return false;
        };

        field_matches(self.resource_type.as_deref(), &action.resource_type)
            && field_matches(self.region.as_deref(), &action.region_slug)
            && field_matches(self.status.as_deref(), &action.status)
            && field_matches(self.action_type.as_deref(), &action.action_type)
            && self.window.contains(completed_at)
    }
}

fn field_matches(wanted: Option<&str>, actual: &str) -> bool {
    wanted.is_none_or(|wanted| wanted == actual)
}

/// Builder that turns raw strings into validated [`FilterCriteria`].
///
/// Empty strings mean "not set", matching how unset flags arrive.
#[derive(Debug, Default)]
pub struct FilterCriteriaBuilder {
    resource_type: Option<String>,
    region: Option<String>,
    status: Option<String>,
    action_type: Option<String>,
    after: Option<String>,
    before: Option<String>,
}

impl FilterCriteriaBuilder {
    /// Filter by resource type.
    #[must_use]
    pub fn resource_type(mut self, value: impl Into<String>) -> Self {
        self.resource_type = non_empty(value.into());
        self
    }

    /// Filter by region slug.
    #[must_use]
    pub fn region(mut self, value: impl Into<String>) -> Self {
        self.region = non_empty(value.into());
        self
    }

    /// Filter by status.
    #[must_use]
    pub fn status(mut self, value: impl Into<String>) -> Self {
        self.status = non_empty(value.into());
        self
    }

    /// Filter by action type.
    #[must_use]
    pub fn action_type(mut self, value: impl Into<String>) -> Self {
        self.action_type = non_empty(value.into());
        self
    }

    /// Keep actions completed at or after this RFC 3339 timestamp.
    #[must_use]
    pub fn after(mut self, value: impl Into<String>) -> Self {
        self.after = non_empty(value.into());
        self
    }

    /// Keep actions completed at or before this RFC 3339 timestamp.
    #[must_use]
    pub fn before(mut self, value: impl Into<String>) -> Self {
        self.before = non_empty(value.into());
        self
    }

    /// Validates the timestamp bounds and produces the criteria.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InvalidTimestamp`] if either bound is not a
    /// valid RFC 3339 timestamp.
    pub fn build(self) -> Result<FilterCriteria> {
        let window = CompletionWindow {
            after: self.after.as_deref().map(|v| parse_bound("after", v)).transpose()?,
            before: self.before.as_deref().map(|v| parse_bound("before", v)).transpose()?,
        };

        Ok(FilterCriteria {
            resource_type: self.resource_type,
            region: self.region,
            status: self.status,
            action_type: self.action_type,
            window,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn parse_bound(field: &'static str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| ActionError::InvalidTimestamp {
            field,
            value: value.to_string(),
            source,
        })
}

/// Returns the actions matching `criteria`, in input order.
///
/// The input slice is left untouched.
#[must_use]
pub fn filter_actions(actions: &[Action], criteria: &FilterCriteria) -> Vec<Action> {
    let out: Vec<Action> = actions
        .iter()
        .filter(|action| criteria.matches(action))
        .cloned()
        .collect();

    tracing::debug!(total = actions.len(), matched = out.len(), "filtered actions");
    out
}

/// Sorts actions by completion time, oldest first.
///
/// The sort is stable: actions with equal timestamps keep their relative
/// order.
pub fn sort_by_completed_at(actions: &mut [Action]) {
    actions.sort_by(|a, b| a.completed_at.cmp(&b.completed_at));
}

/// Filters then sorts, producing the view listing commands display.
#[must_use]
pub fn query_actions(actions: &[Action], criteria: &FilterCriteria) -> Vec<Action> {
    let mut out = filter_actions(actions, criteria);
    sort_by_completed_at(&mut out);
    out
}
