//! larder: search recipes, read recommendations and manage the pantry
//! against a Larder backend.

mod args;
mod commands;
mod config;
mod error;
mod telemetry;

use std::process::ExitCode;

use clap::Parser;

use args::{Cli, Commands};
use commands::Context;
use config::LarderConfig;
use error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = LarderConfig::load(cli.config.as_deref())?;
    telemetry::init_tracing(&config.logging)?;
    let ctx = Context::new(config)?;

    match cli.command {
        Commands::Search {
            term,
            mode,
            pages,
            preview,
        } => commands::search(&ctx, term, mode.into(), pages, preview).await,
        Commands::Recommend { user } => commands::recommend(&ctx, user).await,
        Commands::Pantry(cmd) => commands::pantry(&ctx, cmd.action).await,
        Commands::Home => commands::home(&ctx).await,
    }
}
