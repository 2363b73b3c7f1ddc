//! Read-only views handed to presentation collaborators.
//!
//! A snapshot is a plain copy of the run state at one point in time: node
//! rows, edges, the most recent step outcome, packet totals and the
//! suspicious set. Graph drawings, status tables and reports are rendered
//! from it; nothing here writes anywhere.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::cnt_classifier::suspicious;
use crate::cnt_interface::{NodeId, Role, StepOutcome};
use crate::cnt_state::{NodeStateStore, PacketTotals};
use crate::cnt_topology::Topology;

/// Scale from energy to drawn node size
pub const ENERGY_SIZE_SCALE: f64 = 6.0;

/// Four discrete trust bands used to color nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TrustBand {
    /// trust > 0.75
    Nominal,
    /// trust > 0.50
    Watch,
    /// trust > 0.25
    Concern,
    Alert,
}

impl TrustBand {
    pub fn from_trust(trust: f64) -> Self {
        if trust > 0.75 {
            TrustBand::Nominal
        } else if trust > 0.5 {
            TrustBand::Watch
        } else if trust > 0.25 {
            TrustBand::Concern
        } else {
            TrustBand::Alert
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            TrustBand::Nominal => "#00b300",
            TrustBand::Watch => "#ffaa00",
            TrustBand::Concern => "#ff6600",
            TrustBand::Alert => "#ff0000",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrustBand::Nominal => "nominal",
            TrustBand::Watch => "watch",
            TrustBand::Concern => "concern",
            TrustBand::Alert => "alert",
        }
    }
}

impl fmt::Display for TrustBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Drawn size of a node, linear in its energy
pub fn display_size(energy: f64) -> f64 {
    energy * ENERGY_SIZE_SCALE
}

/// One node as seen by a collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeRow {
    pub node: NodeId,
    pub role: Role,
    pub trust: f64,
    pub energy: f64,
    pub packets_sent: u64,
    pub packets_received: u64,
    pub packets_dropped: u64,
    pub band: TrustBand,
}

/// Snapshot of a run at one point in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    /// Budgeted steps executed when the snapshot was taken
    pub steps_run: usize,
    pub nodes: Vec<NodeRow>,
    pub edges: Vec<(NodeId, NodeId)>,
    pub last_outcome: Option<StepOutcome>,
    pub suspicious: BTreeSet<NodeId>,
    pub totals: PacketTotals,
}

impl NetworkSnapshot {
    pub fn capture(
        topology: &Topology,
        store: &NodeStateStore,
        last_outcome: Option<StepOutcome>,
        threshold: f64,
        steps_run: usize,
    ) -> Self {
        let nodes = store
            .iter()
            .map(|(node, state)| NodeRow {
                node,
                role: state.role(),
                trust: state.trust(),
                energy: state.energy(),
                packets_sent: state.packets_sent(),
                packets_received: state.packets_received(),
                packets_dropped: state.packets_dropped(),
                band: TrustBand::from_trust(state.trust()),
            })
            .collect();

        Self {
            steps_run,
            nodes,
            edges: topology.edges(),
            last_outcome,
            suspicious: suspicious(store, threshold),
            totals: store.totals(),
        }
    }

    pub fn is_stable(&self) -> bool {
        self.suspicious.is_empty()
    }

    /// "Network Stable" or "Suspicious Nodes: [..]"
    pub fn status_line(&self) -> String {
        if self.is_stable() {
            "Network Stable".to_string()
        } else {
            let ids: Vec<NodeId> = self.suspicious.iter().copied().collect();
            format!("Suspicious Nodes: {:?}", ids)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_bands() {
        assert_eq!(TrustBand::from_trust(1.0), TrustBand::Nominal);
        assert_eq!(TrustBand::from_trust(0.76), TrustBand::Nominal);
        assert_eq!(TrustBand::from_trust(0.75), TrustBand::Watch);
        assert_eq!(TrustBand::from_trust(0.51), TrustBand::Watch);
        assert_eq!(TrustBand::from_trust(0.5), TrustBand::Concern);
        assert_eq!(TrustBand::from_trust(0.26), TrustBand::Concern);
        assert_eq!(TrustBand::from_trust(0.25), TrustBand::Alert);
        assert_eq!(TrustBand::from_trust(0.0), TrustBand::Alert);
    }

    #[test]
    fn test_display_size_is_linear() {
        assert_eq!(display_size(100.0), 600.0);
        assert_eq!(display_size(0.0), 0.0);
        assert_eq!(display_size(50.0) * 2.0, display_size(100.0));
    }

    #[test]
    fn test_capture() {
        let topology = Topology::from_edges(3, &[(0, 1), (1, 2)]).unwrap();
        let mut store =
            NodeStateStore::from_roles(&[Role::Honest, Role::Selfish, Role::Malicious]).unwrap();
        store.set_trust(2, 0.3);
        store.record_sent(2);
        store.record_dropped(2);
        let outcome = StepOutcome {
            sender: 2,
            receiver: 1,
            success: false,
        };

        let snapshot = NetworkSnapshot::capture(&topology, &store, Some(outcome), 0.4, 1);

        assert_eq!(snapshot.nodes.len(), 3);
        assert_eq!(snapshot.nodes[2].band, TrustBand::Concern);
        assert_eq!(snapshot.nodes[2].packets_dropped, 1);
        assert_eq!(snapshot.edges, vec![(0, 1), (1, 2)]);
        assert_eq!(snapshot.last_outcome, Some(outcome));
        assert_eq!(snapshot.totals.sent, 1);
        assert_eq!(snapshot.status_line(), "Suspicious Nodes: [2]");
    }

    #[test]
    fn test_stable_status() {
        let topology = Topology::from_edges(1, &[]).unwrap();
        let store = NodeStateStore::from_roles(&[Role::Honest]).unwrap();

        let snapshot = NetworkSnapshot::capture(&topology, &store, None, 0.4, 0);

        assert!(snapshot.is_stable());
        assert_eq!(snapshot.status_line(), "Network Stable");
    }
}
