//! CLI command implementations for spikenet

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::error::CliResult;

pub mod init;
pub mod run;

/// spikenet - epoch-driven spiking network benchmark
#[derive(Parser, Debug)]
#[command(
    name = "spikenet",
    version,
    about = "Epoch-driven spiking network benchmark",
    long_about = "Builds a random network of spiking nodes, stimulates it every epoch \
                  and reports firing throughput (fires/sec, fires/epoch, epochs/sec)."
)]
pub struct SpikenetCli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "SPIKENET_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a random network and benchmark it
    #[command(alias = "bench")]
    Run(run::RunCommand),

    /// Write a default configuration file
    Init(init::InitCommand),
}

impl SpikenetCli {
    /// Execute the CLI command
    pub async fn execute(self) -> CliResult<()> {
        match self.command {
            Commands::Run(cmd) => cmd.execute(self.config).await,
            Commands::Init(cmd) => cmd.execute().await,
        }
    }
}
