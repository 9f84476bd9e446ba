//! Spiking node state and the per-node update rules
//!
//! A node accumulates excitation from incoming signals and decays it lazily:
//! the stored value is only valid as of `last_updated_epoch`, and every read or
//! write first folds the elapsed epochs into a single `decay_factor^k` factor.
//! A node untouched for a thousand epochs costs the same as one touched every
//! epoch.
//!
//! Nodes never hold a reference to their network. Operations that depend on
//! the current epoch take it as an argument and are driven by
//! [`Network`](crate::network::Network), which owns the node arena.

use core::fmt;

use crate::error::{NetError, Result};

/// Discrete global time step
pub type Epoch = u64;

/// Threshold every node starts with (and returns to on [`Node::reset`])
pub const INITIAL_FIRE_THRESHOLD: f64 = 1.0;

/// Stable index of a node inside its owning network's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new node ID
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub const fn raw(&self) -> u32 {
        self.0
    }

    pub(crate) const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

/// Directed weighted edge, owned by its source node
///
/// Positive weights excite the target, negative weights inhibit it. The sign
/// only matters once it is multiplied by the source's fire strength.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Link {
    /// Destination node
    pub target: NodeId,
    /// Synaptic weight
    pub weight: f32,
}

impl Link {
    /// Create a new link
    pub const fn new(target: NodeId, weight: f32) -> Self {
        Self { target, weight }
    }
}

/// Tuning parameters of a node, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NodeParams {
    /// Per-epoch excitation decay, in (0, 1]
    pub decay_factor: f64,
    /// After firing, excitation becomes `fire_threshold * fire_decay`; in (0, 1]
    pub fire_decay: f64,
    /// After firing, `fire_threshold *= sensitivity_factor`; at least 1
    pub sensitivity_factor: f64,
}

impl Default for NodeParams {
    fn default() -> Self {
        Self {
            decay_factor: 0.99,
            fire_decay: 0.2,
            sensitivity_factor: 1.001,
        }
    }
}

impl NodeParams {
    /// Create new node parameters with validation
    pub fn new(decay_factor: f64, fire_decay: f64, sensitivity_factor: f64) -> Result<Self> {
        if !(decay_factor > 0.0 && decay_factor <= 1.0) {
            return Err(NetError::invalid_parameter(
                "decay_factor",
                decay_factor.to_string(),
                "in (0, 1]",
            ));
        }
        if !(fire_decay > 0.0 && fire_decay <= 1.0) {
            return Err(NetError::invalid_parameter(
                "fire_decay",
                fire_decay.to_string(),
                "in (0, 1]",
            ));
        }
        if !(sensitivity_factor >= 1.0 && sensitivity_factor.is_finite()) {
            return Err(NetError::invalid_parameter(
                "sensitivity_factor",
                sensitivity_factor.to_string(),
                ">= 1.0 and finite",
            ));
        }

        Ok(Self {
            decay_factor,
            fire_decay,
            sensitivity_factor,
        })
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        Self::new(self.decay_factor, self.fire_decay, self.sensitivity_factor)?;
        Ok(())
    }
}

/// A spiking node
#[derive(Debug, Clone)]
pub struct Node {
    params: NodeParams,
    links: Vec<Link>,
    excitation: f64,
    fire_threshold: f64,
    fire_strength: f64,
    last_updated_epoch: Epoch,
    queued_to_fire: bool,
    has_fired_at_least_once: bool,
    fire_count: u64,
}

impl Node {
    pub(crate) fn new(params: NodeParams, epoch: Epoch) -> Self {
        Self {
            params,
            links: Vec::new(),
            excitation: 0.0,
            fire_threshold: INITIAL_FIRE_THRESHOLD,
            fire_strength: 0.0,
            last_updated_epoch: epoch,
            queued_to_fire: false,
            has_fired_at_least_once: false,
            fire_count: 0,
        }
    }

    /// Tuning parameters
    pub fn params(&self) -> &NodeParams {
        &self.params
    }

    /// Outgoing links in fire-propagation order
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Current firing threshold
    pub fn fire_threshold(&self) -> f64 {
        self.fire_threshold
    }

    /// Excess excitation recorded when the node was last queued
    pub fn fire_strength(&self) -> f64 {
        self.fire_strength
    }

    /// Number of successful fires
    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }

    /// Whether the node fired at least once
    pub fn has_fired_at_least_once(&self) -> bool {
        self.has_fired_at_least_once
    }

    /// Whether the node currently sits in the firing queue
    pub fn is_queued_to_fire(&self) -> bool {
        self.queued_to_fire
    }

    /// Epoch the stored excitation refers to
    pub fn last_updated_epoch(&self) -> Epoch {
        self.last_updated_epoch
    }

    /// Stored excitation as of [`last_updated_epoch`](Self::last_updated_epoch), without decay
    pub fn raw_excitation(&self) -> f64 {
        self.excitation
    }

    /// Excitation as it would read at `epoch`, without touching the node
    pub fn excitation_at(&self, epoch: Epoch) -> f64 {
        match epoch.checked_sub(self.last_updated_epoch) {
            Some(elapsed) if elapsed > 0 => {
                self.excitation * self.params.decay_factor.powf(elapsed as f64)
            }
            _ => self.excitation,
        }
    }

    /// Fire strength the node would fire with at `epoch`, if it still qualifies
    pub(crate) fn fire_decision(&self, epoch: Epoch) -> Option<f64> {
        if self.excitation_at(epoch) > self.fire_threshold {
            Some(self.fire_strength)
        } else {
            None
        }
    }

    /// Fold the decay of every epoch since the last update into the stored value
    pub(crate) fn refresh(&mut self, epoch: Epoch) {
        if epoch > self.last_updated_epoch {
            self.excitation = self.excitation_at(epoch);
            self.last_updated_epoch = epoch;
        }
    }

    pub(crate) fn excitation(&mut self, epoch: Epoch, normalized: bool) -> f64 {
        self.refresh(epoch);
        if normalized {
            self.excitation / self.fire_threshold
        } else {
            self.excitation
        }
    }

    pub(crate) fn push_link(&mut self, link: Link) {
        self.links.push(link);
    }

    pub(crate) fn take_links(&mut self) -> Vec<Link> {
        std::mem::take(&mut self.links)
    }

    pub(crate) fn restore_links(&mut self, links: Vec<Link>) {
        debug_assert!(self.links.is_empty());
        self.links = links;
    }

    /// Accumulate an incoming signal.
    ///
    /// Only the magnitude of `strength` counts: `ln(1 + |strength|)` is added,
    /// so direct stimulus can never inhibit. Returns true when the node crossed
    /// its threshold and is not queued yet; the caller is expected to enqueue it.
    pub(crate) fn receive(&mut self, strength: f64, epoch: Epoch) -> bool {
        self.refresh(epoch);

        self.excitation += strength.abs().ln_1p();
        if self.excitation < 0.0 {
            self.excitation = 0.0;
        }

        if self.excitation > self.fire_threshold && !self.queued_to_fire {
            self.fire_strength = self.excitation - self.fire_threshold;
            true
        } else {
            false
        }
    }

    pub(crate) fn mark_queued(&mut self) {
        self.queued_to_fire = true;
    }

    pub(crate) fn clear_queued(&mut self) {
        self.queued_to_fire = false;
    }

    /// Post-fire bookkeeping: excitation drops, threshold rises
    pub(crate) fn complete_fire(&mut self) {
        self.excitation = self.fire_threshold * self.params.fire_decay;
        self.fire_threshold *= self.params.sensitivity_factor;
        self.queued_to_fire = false;
        self.has_fired_at_least_once = true;
        self.fire_count += 1;
    }

    /// Rebase onto epoch 0 without changing the decayed magnitude
    pub(crate) fn reset_epochs(&mut self, epoch: Epoch) {
        self.refresh(epoch);
        self.last_updated_epoch = 0;
    }

    /// Full reinitialization of excitation and threshold
    pub(crate) fn reset(&mut self, epoch: Epoch) {
        self.last_updated_epoch = epoch;
        self.excitation = 0.0;
        self.fire_threshold = INITIAL_FIRE_THRESHOLD;
    }
}
