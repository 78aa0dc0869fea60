//! Web Baby CLI: teach a baby AI words and let it learn from the internet.
//!
//! Runs the HTTP backend or drives the same command pipeline and store
//! directly from the terminal.

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
