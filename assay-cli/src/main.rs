//! Assay CLI
//!
//! Command-line interface for submitting documents to the Assay server
//! and following their evaluation.

mod commands;
mod config;
mod display;
mod id_resolver;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "assay")]
#[command(about = "Document evaluation CLI", long_about = None)]
struct Cli {
    /// Assay server URL
    #[arg(long, env = "ASSAY_SERVER_URL", default_value = "http://localhost:8080")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
    };

    handle_command(cli.command, &config).await
}
