use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

// nodes are dense indices into the topology: 0..node_count
pub type NodeId = usize;

// budgeted step counter of one run, 0-based
pub type StepIndex = usize;

pub const INITIAL_TRUST: f64 = 1.0;
pub const MIN_TRUST: f64 = 0.0;
pub const MAX_TRUST: f64 = 1.0;

pub const INITIAL_ENERGY: f64 = 100.0;
pub const MIN_ENERGY: f64 = 0.0;
pub const MAX_ENERGY: f64 = 100.0;

/// Trust gained by a sender for every delivered packet
pub const TRUST_REWARD: f64 = 0.05;

/// Trust lost by a sender for every dropped packet (2x the reward)
pub const TRUST_PENALTY: f64 = 0.10;

/// Energy spent per transmission attempt, drawn uniformly from this range
pub const ENERGY_COST_RANGE: Range<f64> = 0.5..2.0;

pub const DEFAULT_SUSPICION_THRESHOLD: f64 = 0.4;
pub const DEFAULT_EDGE_PROBABILITY: f64 = 0.4;
pub const DEFAULT_STEP_COUNT: usize = 50;
pub const DEFAULT_NODE_COUNT: usize = 10;

pub const MAX_NODE_COUNT: usize = 4096;

/// Node counts offered by the interactive front-end. The engine accepts
/// anything in `1..=MAX_NODE_COUNT`.
pub const UI_NODE_COUNT_RANGE: (usize, usize) = (5, 20);

/// Hidden behavioral policy of a node. Fixed for the lifetime of a run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Honest,
    Selfish,
    Malicious,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Honest, Role::Selfish, Role::Malicious];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Honest => "Honest",
            Role::Selfish => "Selfish",
            Role::Malicious => "Malicious",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Result of one completed sender -> receiver forwarding attempt
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub sender: NodeId,
    pub receiver: NodeId,
    pub success: bool,
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node {} -> Node {} ({})",
            self.sender,
            self.receiver,
            if self.success { "Success" } else { "Failed" }
        )
    }
}

/// Observations emitted by the engine while a run progresses
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Packet delivered by the sender
    PacketForwarded { sender: NodeId, receiver: NodeId },
    /// Packet dropped by the sender
    PacketDropped { sender: NodeId, receiver: NodeId },
    /// Drawn sender has no neighbors, step produced no outcome
    NoNeighbors { sender: NodeId },
    /// Node trust fell below the detection threshold
    NodeFlagged { node: NodeId, trust: f64 },
    /// Previously flagged node recovered to or above the threshold
    NodeCleared { node: NodeId, trust: f64 },
    /// Node energy reached zero
    EnergyDepleted { node: NodeId },
}

pub trait EventSink {
    fn log(&mut self, step: StepIndex, event: Event);
}

/// No-op event sink, the engine default
pub struct NoOpSink;

impl EventSink for NoOpSink {
    #[inline(always)]
    fn log(&mut self, _step: StepIndex, _event: Event) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display_pads() {
        assert_eq!(format!("{:<9}|", Role::Honest), "Honest   |");
        assert_eq!(Role::Malicious.to_string(), "Malicious");
    }

    #[test]
    fn test_outcome_caption() {
        let outcome = StepOutcome {
            sender: 3,
            receiver: 7,
            success: false,
        };
        assert_eq!(outcome.to_string(), "Node 3 -> Node 7 (Failed)");
    }

    #[test]
    fn test_penalty_is_twice_reward() {
        assert!((TRUST_PENALTY - 2.0 * TRUST_REWARD).abs() < 1e-12);
    }
}
