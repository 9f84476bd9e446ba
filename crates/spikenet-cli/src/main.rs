//! # spikenet - benchmark harness for epoch-driven spiking networks

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use spikenet_cli::error::CliResult;
use spikenet_cli::SpikenetCli;

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = SpikenetCli::parse();

    // RUST_LOG wins; otherwise --verbose picks debug
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr so that `run --json` output stays machine-readable
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Err(err) = cli.execute().await {
        error!("Command failed: {}", err);
        std::process::exit(1);
    }

    Ok(())
}
