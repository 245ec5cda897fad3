mod config;
mod lambda;
mod local;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use lambdabot_commands::{build_default_dispatcher, HandlerConfig};
use lambdabot_logging::init_logger;

use config::{Cli, RunMode};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(&cli.log_options());

    let handler_config = HandlerConfig::from_env().context("invalid handler configuration")?;
    let dispatcher = Arc::new(build_default_dispatcher(&handler_config)?);

    info!(
        mode = ?cli.mode,
        commands = dispatcher.registry().len(),
        "Starting lambdabot"
    );

    match cli.mode {
        RunMode::Lambda => lambda::run(dispatcher).await,
        RunMode::Stdout => {
            local::run(&dispatcher, std::io::stdin().lock(), std::io::stdout().lock()).await
        }
    }
}
