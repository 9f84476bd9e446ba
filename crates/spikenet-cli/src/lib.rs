//! spikenet CLI crate
//!
//! Command-line harness around `spikenet_core`. It builds a random network of
//! spiking nodes, stimulates it before every epoch, runs it for a wall-clock or
//! epoch budget and reports firing throughput.
//!
//! Commands (see [commands]):
//! - run: build, drive and report; Ctrl-C stops at the next epoch boundary.
//! - init: write a default TOML configuration file.
//!
//! The binary (src/main.rs) wires up logging and argument parsing and calls
//! [`SpikenetCli::execute`]. The library surface exists so integration tests
//! can reach the commands and configuration types without a subprocess.

pub mod commands;
pub mod config;
pub mod error;

pub use commands::SpikenetCli;
