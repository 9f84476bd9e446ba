//! Benchmark run command

use clap::Args;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use spikenet_core::{RandomNetworkBuilder, RunReport, Simulation};

use crate::config::RunConfig;
use crate::error::{CliError, CliResult};

/// Build a random network and benchmark it
#[derive(Args, Debug, Default)]
pub struct RunCommand {
    /// Number of core nodes
    #[arg(long)]
    pub nodes: Option<u32>,

    /// Minimum outgoing links per node
    #[arg(long)]
    pub min_outputs: Option<u32>,

    /// Maximum outgoing links per node
    #[arg(long)]
    pub max_outputs: Option<u32>,

    /// Number of stimulus nodes
    #[arg(long)]
    pub stimuli: Option<u32>,

    /// Core nodes each stimulus links to
    #[arg(long)]
    pub stimulus_fanout: Option<u32>,

    /// Wall-clock budget in seconds
    #[arg(long)]
    pub seconds: Option<f64>,

    /// Epoch budget (without --seconds, the run is bounded by epochs only)
    #[arg(long)]
    pub epochs: Option<u64>,

    /// Rebase epoch counters every this many epochs
    #[arg(long)]
    pub renormalize_every: Option<u64>,

    /// Random seed for reproducible networks
    #[arg(long)]
    pub seed: Option<u64>,

    /// Evaluate each epoch's batch in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl RunCommand {
    pub async fn execute(self, config_path: Option<PathBuf>) -> CliResult<()> {
        let mut config = RunConfig::resolve(config_path.as_deref())?;
        self.apply_overrides(&mut config);

        let params = config.run_params()?;
        let builder = RandomNetworkBuilder::new(config.topology.clone())
            .with_network_config(config.network_config());

        let stop = Arc::new(AtomicBool::new(false));
        let stop_signal = Arc::clone(&stop);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, stopping at the next epoch boundary");
                stop_signal.store(true, Ordering::Relaxed);
            }
        });

        let report = tokio::task::spawn_blocking(move || -> CliResult<RunReport> {
            let built = builder.build()?;
            let mut simulation = Simulation::new(built, params)?;

            let mut last_report = Duration::ZERO;
            let report = simulation.run(&stop, |progress| {
                debug!(
                    "epoch {} done: {} fired, {} suppressed, {} queued",
                    progress.epoch, progress.fired, progress.suppressed, progress.queued
                );
                if progress.elapsed >= last_report + Duration::from_secs(1) {
                    last_report = progress.elapsed;
                    info!(
                        "{:>6.1}s; epoch {}, {} queued",
                        progress.elapsed.as_secs_f64(),
                        progress.epochs_run,
                        progress.queued
                    );
                }
            })?;
            Ok(report)
        })
        .await
        .map_err(|e| CliError::Generic(anyhow::anyhow!("benchmark task failed: {}", e)))??;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", render_report(&report));
        }

        if report.cancelled {
            return Err(CliError::Cancelled);
        }
        Ok(())
    }

    /// Command-line values win over the config file
    pub fn apply_overrides(&self, config: &mut RunConfig) {
        let topo = &mut config.topology;
        if let Some(v) = self.nodes {
            topo.node_count = v;
        }
        if let Some(v) = self.min_outputs {
            topo.min_outputs = v;
        }
        if let Some(v) = self.max_outputs {
            topo.max_outputs = v;
        }
        if let Some(v) = self.stimuli {
            topo.stimulus_count = v;
        }
        if let Some(v) = self.stimulus_fanout {
            topo.stimulus_fanout = v;
        }
        if self.seed.is_some() {
            topo.seed = self.seed;
        }

        let run = &mut config.run;
        match (self.seconds, self.epochs) {
            (Some(secs), epochs) => {
                run.seconds = Some(secs);
                if epochs.is_some() {
                    run.epochs = epochs;
                }
            }
            (None, Some(epochs)) => {
                run.seconds = None;
                run.epochs = Some(epochs);
            }
            (None, None) => {}
        }
        if self.renormalize_every.is_some() {
            run.renormalize_every = self.renormalize_every;
        }
        if self.parallel {
            run.parallel = true;
        }
    }
}

/// Human-readable throughput summary
pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total fired: {}\n", report.total_fires));
    out.push_str(&format!(
        "Fired nodes: {} of {}\n",
        report.fired_nodes, report.node_count
    ));
    out.push_str(&format!("Fire rate: {:.0} / sec\n", report.fires_per_sec));
    out.push_str(&format!("Fire rate: {:.0} / epoch\n", report.fires_per_epoch));
    out.push_str(&format!("Epoch rate: {:.1} / sec\n", report.epochs_per_sec));
    out.push_str(&format!("Epochs: {}\n", report.epochs));
    out.push_str(&format!("Run time: {:.1} secs\n", report.runtime_secs));
    if report.cancelled {
        out.push_str("Cancelled.\n");
    } else {
        out.push_str("Done.\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let mut config = RunConfig::default();
        let cmd = RunCommand {
            nodes: Some(500),
            seed: Some(3),
            epochs: Some(40),
            parallel: true,
            ..Default::default()
        };
        cmd.apply_overrides(&mut config);

        assert_eq!(config.topology.node_count, 500);
        assert_eq!(config.topology.seed, Some(3));
        assert_eq!(config.topology.max_outputs, 100);
        // Epoch budget alone replaces the wall-clock default
        assert_eq!(config.run.seconds, None);
        assert_eq!(config.run.epochs, Some(40));
        assert!(config.run.parallel);
    }

    #[test]
    fn test_overrides_keep_both_budgets() {
        let mut config = RunConfig::default();
        let cmd = RunCommand {
            seconds: Some(1.5),
            epochs: Some(10),
            ..Default::default()
        };
        cmd.apply_overrides(&mut config);
        assert_eq!(config.run.seconds, Some(1.5));
        assert_eq!(config.run.epochs, Some(10));
    }

    #[test]
    fn test_render_report() {
        let report = RunReport {
            total_fires: 1200,
            fired_nodes: 80,
            node_count: 100,
            epochs: 12,
            runtime_secs: 2.0,
            fires_per_sec: 600.0,
            fires_per_epoch: 100.0,
            epochs_per_sec: 6.0,
            cancelled: false,
        };
        let text = render_report(&report);
        assert!(text.contains("Total fired: 1200"));
        assert!(text.contains("Fired nodes: 80 of 100"));
        assert!(text.contains("Fire rate: 600 / sec"));
        assert!(text.contains("Fire rate: 100 / epoch"));
        assert!(text.contains("Epoch rate: 6.0 / sec"));
        assert!(text.ends_with("Done.\n"));
    }
}
