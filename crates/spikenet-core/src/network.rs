//! Network: node arena, firing queue and epoch progression
//!
//! Nodes do not fire the moment they cross their threshold. They are appended
//! to a FIFO firing queue, and epochs are delimited inside that same queue by
//! [`QueueEntry::EpochBoundary`] sentinels pushed with
//! [`Network::start_new_epoch`]. Running an epoch drains the queue up to and
//! including the next sentinel, so any node queued while the epoch runs lands
//! behind the sentinel and fires one epoch later. Cyclic graphs therefore
//! cannot cascade within a single epoch.

use std::collections::VecDeque;

use crate::{
    error::*,
    node::{Epoch, Link, Node, NodeId, NodeParams},
};

/// Network configuration parameters
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkConfig {
    /// Parameters given to nodes created with [`Network::add_node`]
    pub default_node_params: NodeParams,
}

/// Item of the firing queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEntry {
    /// Node waiting to fire
    Fire(NodeId),
    /// End of the current epoch
    EpochBoundary,
}

/// Result of a single [`Network::run_one_step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Firing queue was empty
    Idle,
    /// A sentinel was consumed and the epoch advanced
    EpochBoundary,
    /// Node fired and propagated to its links
    Fired(NodeId),
    /// Node no longer exceeded its threshold when dequeued
    Suppressed(NodeId),
}

impl StepOutcome {
    /// Whether the caller should stop draining the queue for this epoch
    pub fn ends_epoch(&self) -> bool {
        matches!(self, Self::Idle | Self::EpochBoundary)
    }
}

/// Per-epoch counters returned by [`Network::run_epoch`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EpochSummary {
    /// Nodes that fired
    pub fired: usize,
    /// Nodes dequeued without firing
    pub suppressed: usize,
}

/// Spiking node network
#[derive(Debug, Default)]
pub struct Network {
    /// Network configuration
    pub config: NetworkConfig,
    nodes: Vec<Node>,
    firing_queue: VecDeque<QueueEntry>,
    current_epoch: Epoch,
    fire_count: u64,
}

impl Network {
    /// Create an empty network with default node parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty network with the given configuration
    pub fn with_config(config: NetworkConfig) -> Result<Self> {
        config.default_node_params.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Add a node with the default parameters
    pub fn add_node(&mut self) -> NodeId {
        let params = self.config.default_node_params;
        self.push_node(params)
    }

    /// Add a node with specific parameters
    pub fn add_node_with_params(&mut self, params: NodeParams) -> Result<NodeId> {
        params.validate()?;
        Ok(self.push_node(params))
    }

    fn push_node(&mut self, params: NodeParams) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node::new(params, self.current_epoch));
        id
    }

    /// Get a node
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.index())
            .ok_or(NetError::NodeNotFound { node_id: id.raw() })
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.index())
            .ok_or(NetError::NodeNotFound { node_id: id.raw() })
    }

    /// Iterate over all nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::new(i as u32), node))
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get total number of links across all nodes
    pub fn link_count(&self) -> usize {
        self.nodes.iter().map(|n| n.links().len()).sum()
    }

    /// Link `src` to `dst`.
    ///
    /// Both ends are refreshed to the current epoch first. Self-links,
    /// duplicate links and zero weights are all accepted.
    pub fn link(&mut self, src: NodeId, dst: NodeId, weight: f32) -> Result<()> {
        let epoch = self.current_epoch;
        self.node_mut(dst)?.refresh(epoch);
        let source = self.node_mut(src)?;
        source.refresh(epoch);
        source.push_link(Link::new(dst, weight));
        Ok(())
    }

    /// Deliver a signal of the given strength to a node.
    ///
    /// This is the only way a node becomes runnable: if the node crosses its
    /// threshold and is not queued already, it is appended to the firing queue.
    pub fn incoming(&mut self, id: NodeId, strength: f64) -> Result<()> {
        let epoch = self.current_epoch;
        if self.node_mut(id)?.receive(strength, epoch) {
            self.queue_to_fire(id);
        }
        Ok(())
    }

    /// Current excitation of a node, optionally divided by its threshold
    pub fn excitation(&mut self, id: NodeId, normalized: bool) -> Result<f64> {
        let epoch = self.current_epoch;
        Ok(self.node_mut(id)?.excitation(epoch, normalized))
    }

    /// Rebase a single node's excitation onto epoch 0
    pub fn reset_node_epochs(&mut self, id: NodeId) -> Result<()> {
        let epoch = self.current_epoch;
        self.node_mut(id)?.reset_epochs(epoch);
        Ok(())
    }

    /// Zero a node's excitation and restore its initial threshold
    pub fn reset_node(&mut self, id: NodeId) -> Result<()> {
        let epoch = self.current_epoch;
        self.node_mut(id)?.reset(epoch);
        Ok(())
    }

    pub(crate) fn queue_to_fire(&mut self, id: NodeId) {
        log::trace!("queue {} at epoch {}", id, self.current_epoch);
        self.firing_queue.push_back(QueueEntry::Fire(id));
        self.nodes[id.index()].mark_queued();
    }

    /// Fire a dequeued node.
    ///
    /// Re-checks the threshold at the current epoch: a node that decayed or was
    /// reset while waiting does not fire, but still leaves the queued state.
    pub(crate) fn fire(&mut self, id: NodeId) -> Result<bool> {
        let epoch = self.current_epoch;
        let node = self.node_mut(id)?;
        // Re-checked against the decayed value, not the one seen at queue time
        node.refresh(epoch);

        let Some(strength) = node.fire_decision(epoch) else {
            node.clear_queued();
            return Ok(false);
        };

        // Links are taken out for the duration of the propagation so that a
        // self-link can still reach this node through the arena.
        let links = node.take_links();
        for link in &links {
            self.incoming(link.target, f64::from(link.weight) * strength)?;
        }

        let node = &mut self.nodes[id.index()];
        node.restore_links(links);
        node.complete_fire();
        Ok(true)
    }

    /// Process the head of the firing queue
    pub fn run_one_step(&mut self) -> Result<StepOutcome> {
        match self.firing_queue.pop_front() {
            None => Ok(StepOutcome::Idle),
            Some(QueueEntry::EpochBoundary) => {
                self.current_epoch += 1;
                log::debug!("epoch boundary reached, now at epoch {}", self.current_epoch);
                Ok(StepOutcome::EpochBoundary)
            }
            Some(QueueEntry::Fire(id)) => {
                if self.fire(id)? {
                    self.fire_count += 1;
                    log::trace!("{} fired", id);
                    Ok(StepOutcome::Fired(id))
                } else {
                    log::trace!("{} suppressed", id);
                    Ok(StepOutcome::Suppressed(id))
                }
            }
        }
    }

    /// Run steps until an epoch boundary is consumed or the queue runs dry
    pub fn run_epoch(&mut self) -> Result<EpochSummary> {
        let mut summary = EpochSummary::default();
        loop {
            let outcome = self.run_one_step()?;
            match outcome {
                StepOutcome::Fired(_) => summary.fired += 1,
                StepOutcome::Suppressed(_) => summary.suppressed += 1,
                StepOutcome::Idle | StepOutcome::EpochBoundary => {}
            }
            if outcome.ends_epoch() {
                break;
            }
        }
        Ok(summary)
    }

    /// Append an epoch boundary to the firing queue.
    ///
    /// The epoch counter itself only advances once the boundary is dequeued.
    pub fn start_new_epoch(&mut self) {
        self.firing_queue.push_back(QueueEntry::EpochBoundary);
    }

    /// Rebase every node onto epoch 0 and reset the epoch counter
    pub fn reset_epochs(&mut self) {
        let epoch = self.current_epoch;
        for node in &mut self.nodes {
            node.reset_epochs(epoch);
        }
        log::debug!("renormalized {} nodes from epoch {}", self.nodes.len(), epoch);
        self.current_epoch = 0;
    }

    /// Get current epoch
    pub fn current_epoch(&self) -> Epoch {
        self.current_epoch
    }

    /// Total successful fires since creation or the last
    /// [`reset_fire_count`](Self::reset_fire_count)
    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }

    /// Zero the global fire counter
    pub fn reset_fire_count(&mut self) {
        self.fire_count = 0;
    }

    /// Number of queue entries, epoch boundaries included
    pub fn firing_queue_size(&self) -> usize {
        self.firing_queue.len()
    }

    /// Entry that the next step would process
    pub fn peek_firing_queue(&self) -> Option<QueueEntry> {
        self.firing_queue.front().copied()
    }

    #[cfg(feature = "parallel")]
    pub(crate) fn firing_queue_mut(&mut self) -> &mut VecDeque<QueueEntry> {
        &mut self.firing_queue
    }

    #[cfg(feature = "parallel")]
    pub(crate) fn nodes_slice(&self) -> &[Node] {
        &self.nodes
    }

    #[cfg(feature = "parallel")]
    pub(crate) fn nodes_slice_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    #[cfg(feature = "parallel")]
    pub(crate) fn add_fires(&mut self, fired: u64) {
        self.fire_count += fired;
    }

    #[cfg(feature = "parallel")]
    pub(crate) fn advance_epoch(&mut self) {
        self.current_epoch += 1;
    }
}
