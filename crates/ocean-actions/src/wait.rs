//! Blocking wait for an action to reach a terminal state.
//!
//! The waiter re-fetches the action every poll interval while its status is
//! `in-progress`. Any other status ends the wait and the record is returned
//! as-is; callers decide whether `errored` is a failure.
//!
//! A wait ends early when the [`CancellationToken`] fires, when the optional
//! deadline passes, or when a fetch fails with an error that is either
//! permanent or has exhausted the retry budget.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{ActionError, FetchFailure, Result, WaitError};
use crate::types::{Action, ActionId};

/// Read access to the platform's actions.
pub trait ActionService: Send + Sync {
    /// Error returned by fetches.
    type Error: FetchFailure;

    /// Fetch every visible action.
    fn list(&self) -> impl Future<Output = std::result::Result<Vec<Action>, Self::Error>> + Send;

    /// Fetch one action by id.
    fn get(&self, id: ActionId) -> impl Future<Output = std::result::Result<Action, Self::Error>> + Send;
}

impl<S: ActionService> ActionService for &S {
    type Error = S::Error;

    fn list(&self) -> impl Future<Output = std::result::Result<Vec<Action>, Self::Error>> + Send {
        (**self).list()
    }

    fn get(&self, id: ActionId) -> impl Future<Output = std::result::Result<Action, Self::Error>> + Send {
        (**self).get(id)
    }
}

/// Timed sleep used between polls.
pub trait Sleeper: Send + Sync {
    /// Sleep for `duration`.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// [`Sleeper`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry budget for transient fetch failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Consecutive transient failures tolerated before giving up.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Upper bound on any single retry delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A policy that treats the first fetch error as fatal.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (1-based), doubling each time.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// How a wait polls, gives up and retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Delay between an `in-progress` fetch and the next fetch.
    pub poll_interval: Duration,
    /// Overall limit on the wait, if any.
    pub deadline: Option<Duration>,
    /// Retry budget for transient fetch errors.
    pub retry: RetryPolicy,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(Self::DEFAULT_POLL_SECS),
            deadline: None,
            retry: RetryPolicy::default(),
        }
    }
}

impl WaitPolicy {
    /// Default poll interval in seconds.
    pub const DEFAULT_POLL_SECS: u64 = 5;

    /// Builds a policy polling every `secs` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::InvalidPollInterval`] if `secs` is zero.
    pub fn from_poll_seconds(secs: u64) -> Result<Self> {
        if secs == 0 {
            return Err(ActionError::InvalidPollInterval(secs));
        }
        Ok(Self {
            poll_interval: Duration::from_secs(secs),
            ..Self::default()
        })
    }

    /// Sets an overall deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets the retry budget.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Polls an [`ActionService`] until an action leaves `in-progress`.
#[derive(Debug)]
pub struct ActionWaiter<S, Z = TokioSleeper> {
    service: S,
    sleeper: Z,
    policy: WaitPolicy,
}

impl<S: ActionService> ActionWaiter<S> {
    /// Creates a waiter that sleeps on the tokio timer.
    #[must_use]
    pub fn new(service: S, policy: WaitPolicy) -> Self {
        Self::with_sleeper(service, TokioSleeper, policy)
    }
}

impl<S: ActionService, Z: Sleeper> ActionWaiter<S, Z> {
    /// Creates a waiter with a custom sleeper.
    #[must_use]
    pub fn with_sleeper(service: S, sleeper: Z, policy: WaitPolicy) -> Self {
        Self {
            service,
            sleeper,
            policy,
        }
    }

    /// Returns the active policy.
    #[must_use]
    pub const fn policy(&self) -> &WaitPolicy {
        &self.policy
    }

    /// Waits until action `id` reaches a terminal state and returns it.
    ///
    /// # Errors
    ///
    /// - [`WaitError::Fetch`] with the service's error when a fetch fails
    ///   permanently or retries run out
    /// - [`WaitError::Cancelled`] when `cancel` fires
    /// - [`WaitError::DeadlineExceeded`] when the policy deadline passes
    pub async fn wait_for_completion(
        &self,
        id: ActionId,
        cancel: &CancellationToken,
    ) -> std::result::Result<Action, WaitError<S::Error>> {
        match self.policy.deadline {
            Some(limit) => tokio::time::timeout(limit, self.poll(id, cancel))
                .await
                .map_err(|_| WaitError::DeadlineExceeded {
                    id,
                    waited_secs: limit.as_secs(),
                })?,
            None => self.poll(id, cancel).await,
        }
    }

    async fn poll(
        &self,
        id: ActionId,
        cancel: &CancellationToken,
    ) -> std::result::Result<Action, WaitError<S::Error>> {
        let mut failures = 0u32;

        loop {
            let fetched = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(WaitError::Cancelled(id)),
                result = self.service.get(id) => result,
            };

            match fetched {
                Ok(action) if action.is_terminal() => {
                    debug!(action_id = %id, status = %action.status, "action finished");
                    return Ok(action);
                }
                Ok(_) => {
                    failures = 0;
                    debug!(
                        action_id = %id,
                        poll_secs = self.policy.poll_interval.as_secs(),
                        "action in progress"
                    );
                    self.pause(id, self.policy.poll_interval, cancel).await?;
                }
                Err(err) if err.is_transient() && failures < self.policy.retry.max_retries => {
                    failures += 1;
                    let delay = self.policy.retry.backoff(failures);
                    warn!(
                        action_id = %id,
                        attempt = failures,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient fetch failure, retrying"
                    );
                    self.pause(id, delay, cancel).await?;
                }
                Err(err) => return Err(WaitError::Fetch(err)),
            }
        }
    }

    async fn pause(
        &self,
        id: ActionId,
        duration: Duration,
        cancel: &CancellationToken,
    ) -> std::result::Result<(), WaitError<S::Error>> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(WaitError::Cancelled(id)),
            () = self.sleeper.sleep(duration) => Ok(()),
        }
    }
}
