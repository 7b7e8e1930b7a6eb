//! SitePilot - desktop website agent
//!
//! Main entry point for the SitePilot CLI and HTTP API.

mod cli;
mod cmd_agent;
mod cmd_detect;
mod server;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::server::{BoxError, init_tracing, load_config, run_server};

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        None => run_server(config, None, None).await,
        Some(Commands::Serve { host, port }) => run_server(config, host, port).await,
        Some(Commands::Navigate { text }) => cmd_agent::navigate(config, &text.join(" ")).await,
        Some(Commands::Extract { text }) => cmd_agent::extract(config, &text.join(" ")).await,
        Some(Commands::Detect) => cmd_detect::detect(config).await,
    }
}
