//! Command-line argument parsing with clap.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ocean_actions::{ActionId, FilterCriteria, RetryPolicy, WaitPolicy};
use ocean_api::{ClientConfig, DEFAULT_API_URL};
use ocean_http::{OverflowPolicy, TraceConfig};

use crate::error::CliError;

/// oceanctl - inspect and wait on cloud infrastructure actions.
#[derive(Parser, Debug, Clone)]
#[command(name = "oceanctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// API access token.
    #[arg(short = 't', long, env = "OCEAN_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub access_token: Option<String>,

    /// Base URL of the API.
    #[arg(short = 'u', long, env = "OCEAN_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    pub output: Format,

    /// Omit the header row from table output.
    #[arg(long, global = true)]
    pub no_header: bool,

    /// Log every HTTP request and response.
    #[arg(long, env = "OCEAN_TRACE", global = true)]
    pub trace: bool,

    /// Trace records buffered per direction before the overflow policy applies.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_CAPACITY, global = true)]
    pub trace_capacity: usize,

    /// What to do when the trace buffer is full.
    #[arg(long, value_enum, default_value_t = TraceOverflow::DropOldest, global = true)]
    pub trace_overflow: TraceOverflow,

    /// How long a full trace buffer may hold up a request with `--trace-overflow block`.
    #[arg(long, default_value_t = 1000, value_name = "MS", global = true)]
    pub trace_block_ms: u64,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Tracing settings, if `--trace` was given.
    pub fn trace_config(&self) -> Option<TraceConfig> {
        self.trace.then(|| {
            let overflow = match self.trace_overflow {
                TraceOverflow::DropOldest => OverflowPolicy::DropOldest,
                TraceOverflow::Block => {
                    OverflowPolicy::BlockWithTimeout(Duration::from_millis(self.trace_block_ms))
                }
            };
            TraceConfig::new(self.trace_capacity, overflow)
        })
    }

    /// API client settings.
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.access_token.clone().unwrap_or_default())
            .with_api_url(self.api_url.clone());
        match self.trace_config() {
            Some(trace) => config.with_trace(trace),
            None => config,
        }
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Trace buffer overflow behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TraceOverflow {
    /// Evict the oldest buffered record.
    #[default]
    DropOldest,
    /// Wait up to `--trace-block-ms` for space, then drop the new record.
    Block,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Inspect actions: asynchronous jobs run against your resources.
    Action {
        /// Action subcommand to execute.
        #[command(subcommand)]
        command: ActionCommands,
    },
}

/// Action subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ActionCommands {
    /// Show one action.
    #[command(visible_alias = "g")]
    Get {
        /// Action ID.
        id: ActionId,
    },

    /// List actions, oldest completion first.
    ///
    /// Actions that have not completed are never listed.
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Block until an action is no longer in progress, then show it.
    #[command(visible_alias = "w")]
    Wait(WaitArgs),
}

/// Filters for `action list`.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Only actions on this kind of resource, e.g. `droplet`.
    #[arg(long)]
    pub resource_type: Option<String>,

    /// Only actions in this region slug, e.g. `nyc3`.
    #[arg(long)]
    pub region: Option<String>,

    /// Only actions with this status, e.g. `completed`.
    #[arg(long)]
    pub status: Option<String>,

    /// Only actions of this type, e.g. `create`.
    #[arg(long = "type", value_name = "TYPE")]
    pub action_type: Option<String>,

    /// Only actions completed at or after this RFC 3339 time.
    #[arg(long, value_name = "RFC3339")]
    pub after: Option<String>,

    /// Only actions completed at or before this RFC 3339 time.
    #[arg(long, value_name = "RFC3339")]
    pub before: Option<String>,
}

impl ListArgs {
    /// Validates the flags into [`FilterCriteria`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--after` or `--before` is not RFC 3339.
    pub fn criteria(&self) -> Result<FilterCriteria, CliError> {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        Ok(FilterCriteria::builder()
            .resource_type(text(&self.resource_type))
            .region(text(&self.region))
            .status(text(&self.status))
            .action_type(text(&self.action_type))
            .after(text(&self.after))
            .before(text(&self.before))
            .build()?)
    }
}

/// Options for `action wait`.
#[derive(Args, Debug, Clone)]
pub struct WaitArgs {
    /// Action ID.
    pub id: ActionId,

    /// Seconds between polls.
    #[arg(long, default_value_t = WaitPolicy::DEFAULT_POLL_SECS, value_name = "SECS")]
    pub poll_timeout: u64,

    /// Give up after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Consecutive transient API failures tolerated while polling.
    #[arg(long, default_value_t = 3)]
    pub max_retries: u32,
}

impl WaitArgs {
    /// Validates the flags into a [`WaitPolicy`].
    ///
    /// # Errors
    ///
    /// Returns an error if `--poll-timeout` is zero.
    pub fn policy(&self) -> Result<WaitPolicy, CliError> {
        let policy = WaitPolicy::from_poll_seconds(self.poll_timeout)?.with_retry(RetryPolicy {
            max_retries: self.max_retries,
            ..RetryPolicy::default()
        });
        match self.timeout {
            None => Ok(policy),
            Some(0) => Err(CliError::InvalidArgument(
                "--timeout must be at least 1 second".into(),
            )),
            Some(secs) => Ok(policy.with_deadline(Duration::from_secs(secs))),
        }
    }
}
