mod cli;
mod client;
mod controller;
mod model;
mod output;
#[cfg(test)]
mod testutil;
#[cfg(feature = "tui")]
mod tui;

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();
    cli::run(args).await
}
