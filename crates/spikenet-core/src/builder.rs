//! Random network construction
//!
//! Builds the benchmark topology: a core population where every node links to
//! a random number of uniformly chosen peers with weight `+1` or `-1`, plus a
//! set of stimulus nodes that fan out into the core with a fixed weight. The
//! builder is a plain client of the [`Network`] API.

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    error::*,
    network::{Network, NetworkConfig},
    node::NodeId,
};

/// Shape of a random benchmark network
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TopologyConfig {
    /// Number of core nodes
    pub node_count: u32,
    /// Minimum outgoing links per core node
    pub min_outputs: u32,
    /// Maximum outgoing links per core node
    pub max_outputs: u32,
    /// Number of stimulus nodes
    pub stimulus_count: u32,
    /// Core nodes each stimulus links to
    pub stimulus_fanout: u32,
    /// Weight of stimulus links
    pub stimulus_weight: f32,
    /// Seed for reproducible graphs (None = entropy)
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub seed: Option<u64>,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            node_count: 10_000,
            min_outputs: 10,
            max_outputs: 100,
            stimulus_count: 100,
            stimulus_fanout: 100,
            stimulus_weight: 1.0,
            seed: None,
        }
    }
}

impl TopologyConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.node_count == 0 {
            return Err(NetError::invalid_parameter("node_count", "0", "> 0"));
        }
        if self.min_outputs > self.max_outputs {
            return Err(NetError::invalid_parameter(
                "min_outputs",
                format!("{} (with max_outputs={})", self.min_outputs, self.max_outputs),
                "<= max_outputs",
            ));
        }
        if !self.stimulus_weight.is_finite() {
            return Err(NetError::invalid_parameter(
                "stimulus_weight",
                self.stimulus_weight.to_string(),
                "finite",
            ));
        }
        Ok(())
    }

    /// Set the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Network together with the handles the driver needs
#[derive(Debug)]
pub struct BuiltNetwork {
    /// The network
    pub network: Network,
    /// Core population, in creation order
    pub core: Vec<NodeId>,
    /// Stimulus nodes, in creation order
    pub stimuli: Vec<NodeId>,
}

/// Builder for random benchmark networks
#[derive(Debug)]
pub struct RandomNetworkBuilder {
    topology: TopologyConfig,
    network_config: NetworkConfig,
}

impl RandomNetworkBuilder {
    /// Create a new builder
    pub fn new(topology: TopologyConfig) -> Self {
        Self {
            topology,
            network_config: NetworkConfig::default(),
        }
    }

    /// Set network configuration
    pub fn with_network_config(mut self, config: NetworkConfig) -> Self {
        self.network_config = config;
        self
    }

    /// Build the network
    pub fn build(self) -> Result<BuiltNetwork> {
        let topo = &self.topology;
        topo.validate()?;
        if topo.stimulus_count == 0 || topo.stimulus_fanout == 0 {
            log::warn!("topology has no stimulus links, the network will stay silent");
        }

        let mut rng = match topo.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut network = Network::with_config(self.network_config)?;

        let core: Vec<NodeId> = (0..topo.node_count).map(|_| network.add_node()).collect();

        for &src in &core {
            let outputs = rng.gen_range(topo.min_outputs..=topo.max_outputs);
            for _ in 0..outputs {
                let dst = core[rng.gen_range(0..core.len())];
                let weight = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                network.link(src, dst, weight)?;
            }
        }
        log::debug!(
            "built core of {} nodes with {} links",
            core.len(),
            network.link_count()
        );

        let mut stimuli = Vec::with_capacity(topo.stimulus_count as usize);
        for _ in 0..topo.stimulus_count {
            let stimulus = network.add_node();
            for _ in 0..topo.stimulus_fanout {
                let dst = core[rng.gen_range(0..core.len())];
                network.link(stimulus, dst, topo.stimulus_weight)?;
            }
            stimuli.push(stimulus);
        }

        log::info!(
            "network ready: {} core nodes, {} stimuli, {} links",
            core.len(),
            stimuli.len(),
            network.link_count()
        );

        Ok(BuiltNetwork {
            network,
            core,
            stimuli,
        })
    }
}
