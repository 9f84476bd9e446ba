//! Configuration file initialization command

use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::config::RunConfig;
use crate::error::{CliError, CliResult};

/// Write a default configuration file
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Target path (defaults to the user configuration directory)
    pub path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

impl InitCommand {
    pub async fn execute(self) -> CliResult<()> {
        let path = match self.path {
            Some(path) => path,
            None => RunConfig::default_config_path()?,
        };

        if path.exists() && !self.force {
            return Err(CliError::invalid_args(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        RunConfig::default().save_to_file(&path)?;
        info!("Configuration written to {}", path.display());
        Ok(())
    }
}
