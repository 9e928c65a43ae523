//! `oceanctl action` implementation.

use std::io::Write;

use ocean_actions::{ActionId, ActionService, ActionWaiter, query_actions};
use ocean_api::ApiError;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::{ActionCommands, ListArgs, WaitArgs};
use crate::error::CliError;
use crate::output::{ActionList, OutputFormat};

/// Action command executor.
pub struct ActionCommand<S> {
    service: S,
}

impl<S> ActionCommand<S>
where
    S: ActionService<Error = ApiError>,
{
    /// Create a command backed by `service`.
    #[must_use]
    pub const fn new(service: S) -> Self {
        Self { service }
    }

    /// Execute an action subcommand.
    ///
    /// Nothing is written unless the whole command succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are invalid, an API call fails, the
    /// wait is cancelled or times out, or output fails.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        command: &ActionCommands,
        cancel: &CancellationToken,
    ) -> Result<(), CliError> {
        let actions = match command {
            ActionCommands::Get { id } => self.get(*id).await?,
            ActionCommands::List(args) => self.list(args).await?,
            ActionCommands::Wait(args) => self.wait(args, cancel).await?,
        };
        format.write(writer, &actions)
    }

    /// Fetch one action.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn get(&self, id: ActionId) -> Result<ActionList, CliError> {
        let action = self.service.get(id).await?;
        Ok(ActionList::single(action))
    }

    /// Fetch, filter and sort every action.
    ///
    /// # Errors
    ///
    /// Returns an error if a time bound is malformed or the API call fails.
    pub async fn list(&self, args: &ListArgs) -> Result<ActionList, CliError> {
        let criteria = args.criteria()?;
        let actions = self.service.list().await?;
        let selected = query_actions(&actions, &criteria);
        debug!(fetched = actions.len(), shown = selected.len(), "listed actions");
        Ok(ActionList::new(selected))
    }

    /// Poll until the action leaves `in-progress`.
    ///
    /// # Errors
    ///
    /// Returns an error if the wait options are invalid or the wait fails.
    pub async fn wait(&self, args: &WaitArgs, cancel: &CancellationToken) -> Result<ActionList, CliError> {
        let policy = args.policy()?;
        let waiter = ActionWaiter::new(&self.service, policy);
        let action = waiter.wait_for_completion(args.id, cancel).await?;
        Ok(ActionList::single(action))
    }
}
