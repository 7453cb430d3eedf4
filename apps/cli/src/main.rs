//! ironbar-docs CLI: documentation content generator for Ironbar.
//!
//! Ingests upstream markdown and the configuration schema into cached
//! documentation pages, and answers per-request navigation queries.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
