//! Epoch-driven spiking node network engine
//!
//! Nodes accumulate excitation from weighted incoming signals and, once above
//! their threshold, are queued to fire in the *next* epoch. Firing pushes
//! `weight * fire_strength` onto every successor, resets the node's
//! excitation and raises its threshold. Excitation decays lazily: a node pays
//! for elapsed epochs only when it is touched again.
//!
//! ```
//! use spikenet_core::Network;
//!
//! let mut net = Network::new();
//! let a = net.add_node();
//! let b = net.add_node();
//! net.link(a, b, 50.0).unwrap();
//!
//! net.incoming(a, 2.0).unwrap();
//! net.start_new_epoch();
//! net.run_epoch().unwrap();
//!
//! assert_eq!(net.fire_count(), 1);
//! assert!(net.node(b).unwrap().is_queued_to_fire());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod builder;
pub mod error;
pub mod network;
pub mod node;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod simulation;

// Re-export essential types
pub use builder::{BuiltNetwork, RandomNetworkBuilder, TopologyConfig};
pub use error::{NetError, Result};
pub use network::{EpochSummary, Network, NetworkConfig, QueueEntry, StepOutcome};
pub use node::{Epoch, Link, Node, NodeId, NodeParams, INITIAL_FIRE_THRESHOLD};
pub use simulation::{EpochProgress, RunParams, RunReport, Simulation};
