//! Error types for simulation construction.

use thiserror::Error;

use crate::cnt_interface::NodeId;

/// Errors raised while building a simulation. Once a run is constructed
/// no step can fail.
#[derive(Error, Debug)]
pub enum SimError {
    /// A configuration value is outside its accepted domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name as it appears in the configuration.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// A hand-built topology or store referenced a node outside `[0, N)`.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),

    /// Configuration text could not be parsed.
    #[error("malformed configuration: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl SimError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        SimError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type for simulation construction.
pub type Result<T> = std::result::Result<T, SimError>;
