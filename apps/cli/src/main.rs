//! MineScout CLI: guided web research for mining projects.
//!
//! Turns a company/project label into eight targeted searches (location,
//! coordinates, commodity, drilling, stage, resources, competency, process)
//! and lets you record what you find into a CSV report.

mod commands;
mod output;
mod session;

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
