//! vault-patch CLI
//!
//! This is the main entry point for the CLI application.

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

use vault_patch::cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let config = match cli::resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not set up yet; the level itself may be the problem
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    cli::init_logging(&config);

    match cli::execute(cli, &config, Box::new(std::io::stdin())).await {
        Ok(outcome) => {
            info!("{}", outcome.summary());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
