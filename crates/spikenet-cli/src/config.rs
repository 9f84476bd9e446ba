//! Configuration management for the spikenet CLI

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use spikenet_core::{NetworkConfig, NodeParams, RunParams, TopologyConfig};

use crate::error::{CliError, CliResult};

/// Benchmark run configuration, as stored in `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Random network shape
    pub topology: TopologyConfig,

    /// Driver settings
    pub run: RunSection,

    /// Parameters shared by every node
    pub node: NodeParams,
}

/// `[run]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    /// Wall-clock budget in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds: Option<f64>,

    /// Epoch budget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epochs: Option<u64>,

    /// Strength injected into every stimulus before each epoch
    pub stimulus_strength: f64,

    /// Rebase epoch counters every this many epochs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renormalize_every: Option<u64>,

    /// Evaluate each epoch's batch in parallel
    pub parallel: bool,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            seconds: Some(20.0),
            epochs: None,
            stimulus_strength: 2.0,
            renormalize_every: Some(100),
            parallel: false,
        }
    }
}

impl RunConfig {
    /// Load configuration from file
    pub fn load_from_file(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Resolve the configuration: explicit path, then the user config file, then defaults
    pub fn resolve(explicit: Option<&Path>) -> CliResult<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(CliError::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return Self::load_from_file(path);
        }

        match Self::default_config_path() {
            Ok(path) if path.exists() => {
                tracing::debug!("Using config file {}", path.display());
                Self::load_from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &Path) -> CliResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::config("Could not determine config directory"))?;
        Ok(config_dir.join("spikenet").join("config.toml"))
    }

    /// Engine run parameters
    pub fn run_params(&self) -> CliResult<RunParams> {
        let duration = match self.run.seconds {
            Some(secs) if !(secs.is_finite() && secs > 0.0) => {
                return Err(CliError::config(format!(
                    "run.seconds must be a positive number, got {}",
                    secs
                )))
            }
            Some(secs) => {
                let duration = Duration::try_from_secs_f64(secs).map_err(|e| {
                    CliError::config(format!("run.seconds is out of range ({}): {}", secs, e))
                })?;
                Some(duration)
            }
            None => None,
        };

        let params = RunParams {
            duration,
            max_epochs: self.run.epochs,
            stimulus_strength: self.run.stimulus_strength,
            renormalize_every: self.run.renormalize_every,
            parallel: self.run.parallel,
        };
        params.validate()?;
        Ok(params)
    }

    /// Engine network configuration
    pub fn network_config(&self) -> NetworkConfig {
        NetworkConfig {
            default_node_params: self.node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_matches_engine_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.topology, TopologyConfig::default());
        assert_eq!(config.node, NodeParams::default());

        let params = config.run_params().unwrap();
        assert_eq!(params, RunParams::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = RunConfig::default();
        config.topology.node_count = 123;
        config.topology.seed = Some(5);
        config.run.epochs = Some(10);
        config.save_to_file(&path).unwrap();

        let loaded = RunConfig::resolve(Some(path.as_path())).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[topology]\nnode_count = 42\n\n[node]\nfire_decay = 0.5\n").unwrap();

        let config = RunConfig::load_from_file(&path).unwrap();
        assert_eq!(config.topology.node_count, 42);
        assert_eq!(config.topology.max_outputs, 100);
        assert_eq!(config.node.fire_decay, 0.5);
        assert_eq!(config.node.decay_factor, 0.99);
        assert_eq!(config.run, RunSection::default());
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempdir().unwrap();
        let absent = dir.path().join("absent.toml");
        let err = RunConfig::resolve(Some(absent.as_path())).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn test_invalid_run_section() {
        let mut config = RunConfig::default();
        config.run.seconds = Some(-1.0);
        assert!(config.run_params().is_err());

        config.run.seconds = None;
        assert!(matches!(config.run_params(), Err(CliError::Core(_))));
    }

    #[test]
    fn test_oversized_duration_is_rejected() {
        let mut config = RunConfig::default();
        config.run.seconds = Some(1e300);
        let err = config.run_params().unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
        assert!(err.to_string().contains("out of range"));
    }
}
