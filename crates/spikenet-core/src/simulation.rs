//! Benchmark driver for spiking networks
//!
//! Repeatedly stimulates a built network and runs it epoch by epoch until a
//! wall-clock budget, an epoch budget or an external stop request ends the
//! run, then reports throughput.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::{
    builder::BuiltNetwork,
    error::*,
    network::{EpochSummary, Network},
    node::Epoch,
};

/// Run parameters
#[derive(Debug, Clone, PartialEq)]
pub struct RunParams {
    /// Wall-clock budget
    pub duration: Option<Duration>,
    /// Epoch budget
    pub max_epochs: Option<u64>,
    /// Strength injected into every stimulus node before each epoch
    pub stimulus_strength: f64,
    /// Rebase epoch counters whenever the current epoch is a multiple of this
    pub renormalize_every: Option<u64>,
    /// Use [`Network::run_epoch_parallel`] when available
    pub parallel: bool,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            duration: Some(Duration::from_secs(20)),
            max_epochs: None,
            stimulus_strength: 2.0,
            renormalize_every: Some(100),
            parallel: false,
        }
    }
}

impl RunParams {
    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if self.duration.is_none() && self.max_epochs.is_none() {
            return Err(NetError::invalid_config(
                "run needs a duration or an epoch budget",
            ));
        }
        if self.renormalize_every == Some(0) {
            return Err(NetError::invalid_parameter("renormalize_every", "0", "> 0"));
        }
        if !self.stimulus_strength.is_finite() {
            return Err(NetError::invalid_parameter(
                "stimulus_strength",
                self.stimulus_strength.to_string(),
                "finite",
            ));
        }
        Ok(())
    }

    /// Set wall-clock budget
    pub fn with_duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }

    /// Set epoch budget
    pub fn with_max_epochs(mut self, max_epochs: Option<u64>) -> Self {
        self.max_epochs = max_epochs;
        self
    }

    /// Set renormalization period
    pub fn with_renormalize_every(mut self, every: Option<u64>) -> Self {
        self.renormalize_every = every;
        self
    }

    /// Enable or disable parallel epochs
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Snapshot handed to the progress callback after every epoch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochProgress {
    /// Network epoch after the run (renormalization may reset it)
    pub epoch: Epoch,
    /// Epochs completed in this run
    pub epochs_run: u64,
    /// Firing queue depth
    pub queued: usize,
    /// Nodes fired in this epoch
    pub fired: usize,
    /// Nodes suppressed in this epoch
    pub suppressed: usize,
    /// Wall-clock time since the run started
    pub elapsed: Duration,
}

/// Throughput report of a finished run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunReport {
    /// Successful fires, stimuli included
    pub total_fires: u64,
    /// Core nodes that fired at least once
    pub fired_nodes: usize,
    /// Core node count
    pub node_count: usize,
    /// Epochs completed
    pub epochs: u64,
    /// Wall-clock runtime in seconds
    pub runtime_secs: f64,
    /// Fires per second
    pub fires_per_sec: f64,
    /// Fires per epoch
    pub fires_per_epoch: f64,
    /// Epochs per second
    pub epochs_per_sec: f64,
    /// Run ended on an external stop request
    pub cancelled: bool,
}

impl RunReport {
    fn new(
        total_fires: u64,
        fired_nodes: usize,
        node_count: usize,
        epochs: u64,
        runtime: Duration,
    ) -> Self {
        let runtime_secs = runtime.as_secs_f64();
        let per_sec = |v: f64| if runtime_secs > 0.0 { v / runtime_secs } else { 0.0 };

        Self {
            total_fires,
            fired_nodes,
            node_count,
            epochs,
            runtime_secs,
            fires_per_sec: per_sec(total_fires as f64),
            fires_per_epoch: if epochs > 0 {
                total_fires as f64 / epochs as f64
            } else {
                0.0
            },
            epochs_per_sec: per_sec(epochs as f64),
            cancelled: false,
        }
    }
}

/// Simulation engine
#[derive(Debug)]
pub struct Simulation {
    built: BuiltNetwork,
    params: RunParams,
}

impl Simulation {
    /// Create a new simulation
    pub fn new(built: BuiltNetwork, params: RunParams) -> Result<Self> {
        params.validate()?;
        if params.parallel && !cfg!(feature = "parallel") {
            log::warn!(
                "parallel epochs requested but the `parallel` feature is off, running sequentially"
            );
        }
        Ok(Self { built, params })
    }

    /// Get reference to network
    pub fn network(&self) -> &Network {
        &self.built.network
    }

    /// Get run parameters
    pub fn params(&self) -> &RunParams {
        &self.params
    }

    /// Give back the network and its handles
    pub fn into_inner(self) -> BuiltNetwork {
        self.built
    }

    /// Run until a budget is exhausted or `stop` is raised
    pub fn run<F>(&mut self, stop: &AtomicBool, mut on_epoch: F) -> Result<RunReport>
    where
        F: FnMut(&EpochProgress),
    {
        log::info!(
            "Starting run: {} nodes, {} stimuli, budget {:?} / {:?} epochs",
            self.built.core.len(),
            self.built.stimuli.len(),
            self.params.duration,
            self.params.max_epochs
        );

        let start = Instant::now();
        let strength = self.params.stimulus_strength;

        for &stimulus in &self.built.stimuli {
            self.built.network.incoming(stimulus, strength)?;
        }
        self.built.network.start_new_epoch();

        let mut epochs_run = 0u64;
        let mut cancelled = false;

        loop {
            if stop.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }
            if self.params.max_epochs.is_some_and(|max| epochs_run >= max) {
                break;
            }
            if self.params.duration.is_some_and(|d| start.elapsed() >= d) {
                break;
            }

            let summary = self.run_epoch()?;
            epochs_run += 1;

            let network = &mut self.built.network;
            on_epoch(&EpochProgress {
                epoch: network.current_epoch(),
                epochs_run,
                queued: network.firing_queue_size(),
                fired: summary.fired,
                suppressed: summary.suppressed,
                elapsed: start.elapsed(),
            });

            // Stimuli queued after the boundary fire one epoch after the
            // nodes queued during the epoch that just ran.
            network.start_new_epoch();
            for &stimulus in &self.built.stimuli {
                network.reset_node(stimulus)?;
                network.incoming(stimulus, strength)?;
            }

            if let Some(every) = self.params.renormalize_every {
                if network.current_epoch() % every == 0 {
                    network.reset_epochs();
                }
            }
        }

        let network = &self.built.network;
        let fired_nodes = self
            .built
            .core
            .iter()
            .filter(|&&id| network.node(id).is_ok_and(|n| n.has_fired_at_least_once()))
            .count();

        let mut report = RunReport::new(
            network.fire_count(),
            fired_nodes,
            self.built.core.len(),
            epochs_run,
            start.elapsed(),
        );
        report.cancelled = cancelled;

        if cancelled {
            log::warn!("Run cancelled after {} epochs", epochs_run);
        }
        log::info!(
            "Run completed: {} fires in {} epochs ({:.1} epochs/sec)",
            report.total_fires,
            report.epochs,
            report.epochs_per_sec
        );
        Ok(report)
    }

    #[cfg(feature = "parallel")]
    fn run_epoch(&mut self) -> Result<EpochSummary> {
        if self.params.parallel {
            self.built.network.run_epoch_parallel()
        } else {
            self.built.network.run_epoch()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn run_epoch(&mut self) -> Result<EpochSummary> {
        self.built.network.run_epoch()
    }
}
