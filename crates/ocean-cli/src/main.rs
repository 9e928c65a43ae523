//! oceanctl binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use ocean_api::ApiClient;
use ocean_http::spawn_trace_logger;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use ocean_cli::cli::{Cli, Commands};
use ocean_cli::commands::ActionCommand;
use ocean_cli::output::OutputFormat;
use ocean_cli::CliError;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.trace);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr. `RUST_LOG` wins; otherwise warnings only, or info
/// when tracing so the trace records show up.
fn init_tracing(trace: bool) {
    let default = if trace { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let format = OutputFormat::new(cli.output).with_header(!cli.no_header);
    let (client, streams) = ApiClient::connect(&cli.client_config())?;
    let logger = streams.map(spawn_trace_logger);

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(cancel_on_interrupt(cancel.clone()));

    let result = dispatch_until_cancelled(&client, &cli.command, &format, &cancel).await;
    interrupt.abort();

    // Closes the trace streams so the logger can drain and exit.
    drop(client);
    if let Some(logger) = logger {
        if let Err(e) = logger.await {
            warn!(error = %e, "trace logger stopped abnormally");
        }
    }

    result
}

/// Installing the interrupt handler disables the default SIGINT exit, so
/// every command stops here once `cancel` fires. `wait` is polled first and
/// reports its own cancellation.
async fn dispatch_until_cancelled(
    client: &ApiClient,
    command: &Commands,
    format: &OutputFormat,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    tokio::select! {
        biased;
        result = dispatch(client, command, format, cancel) => result,
        () = cancel.cancelled() => Err(CliError::Interrupted),
    }
}

async fn dispatch(
    client: &ApiClient,
    command: &Commands,
    format: &OutputFormat,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();

    match command {
        Commands::Action { command } => {
            let cmd = ActionCommand::new(client.actions());
            cmd.execute(&mut stdout, format, command, cancel).await?;
        }
    }

    Ok(())
}

async fn cancel_on_interrupt(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        debug!("interrupt received, cancelling");
        cancel.cancel();
    }
}
