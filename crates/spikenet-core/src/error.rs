//! Error types for the spiking network engine
//!
//! Firing outcomes (suppressed fires, an empty queue) are not errors and never
//! show up here. These variants cover programmer misuse only: unknown node
//! handles and out-of-range tuning parameters.

use thiserror::Error;

/// Result type for network operations
pub type Result<T> = std::result::Result<T, NetError>;

/// Errors that can occur while building or driving a network
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NetError {
    /// Node handle does not belong to this network
    #[error("Node {node_id} not found")]
    NodeNotFound {
        /// Raw index that was looked up
        node_id: u32,
    },

    /// Invalid parameter value
    #[error("Invalid parameter {parameter}: {value} (expected {constraint})")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Invalid value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Invalid network or run configuration
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Reason for invalid configuration
        reason: String,
    },
}

impl NetError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(
        parameter: impl Into<String>,
        value: impl Into<String>,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            constraint: constraint.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
