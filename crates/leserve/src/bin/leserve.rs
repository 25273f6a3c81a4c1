//! leserve binary entry point

use clap::Parser;
use leserve::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    Cli::parse().run().await
}
