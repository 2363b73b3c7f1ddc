// Node State Store
//
// Sole owner of every mutable per-node attribute. Trust and energy are clamped
// on every write so the range invariants hold after any mutation; counters
// only ever grow.

use rand::Rng;
use serde::Serialize;

use crate::cnt_error::{Result, SimError};
use crate::cnt_interface::{
    NodeId, Role, INITIAL_ENERGY, INITIAL_TRUST, MAX_ENERGY, MAX_TRUST, MIN_ENERGY, MIN_TRUST,
};
use crate::cnt_topology::Topology;

/// Attributes of a single node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeState {
    role: Role,
    trust: f64,
    energy: f64,
    packets_sent: u64,
    packets_received: u64,
    packets_dropped: u64,
}

impl NodeState {
    fn new(role: Role) -> Self {
        Self {
            role,
            trust: INITIAL_TRUST,
            energy: INITIAL_ENERGY,
            packets_sent: 0,
            packets_received: 0,
            packets_dropped: 0,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn trust(&self) -> f64 {
        self.trust
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn packets_sent(&self) -> u64 {
        self.packets_sent
    }

    pub fn packets_received(&self) -> u64 {
        self.packets_received
    }

    pub fn packets_dropped(&self) -> u64 {
        self.packets_dropped
    }
}

/// Network-wide packet counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PacketTotals {
    pub sent: u64,
    pub received: u64,
    pub dropped: u64,
}

/// Per-node state, indexed by `NodeId`
#[derive(Debug, Clone, PartialEq)]
pub struct NodeStateStore {
    nodes: Vec<NodeState>,
}

impl NodeStateStore {
    /// Create state for every node of `topology`, with roles drawn uniformly
    /// from Honest / Selfish / Malicious
    pub fn initialize<R: Rng>(topology: &Topology, rng: &mut R) -> Self {
        let nodes = topology
            .nodes()
            .map(|_| NodeState::new(Role::ALL[rng.gen_range(0..Role::ALL.len())]))
            .collect();
        Self { nodes }
    }

    /// Create a store with fixed roles, node `i` taking `roles[i]`
    pub fn from_roles(roles: &[Role]) -> Result<Self> {
        if roles.is_empty() {
            return Err(SimError::invalid("node_count", "store needs at least one node"));
        }
        Ok(Self {
            nodes: roles.iter().map(|role| NodeState::new(*role)).collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, node: NodeId) -> Option<&NodeState> {
        self.nodes.get(node)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeState)> + '_ {
        self.nodes.iter().enumerate()
    }

    // Accessors below index directly and panic on an unknown node, the same
    // contract as slice indexing.

    pub fn role(&self, node: NodeId) -> Role {
        self.nodes[node].role
    }

    pub fn trust(&self, node: NodeId) -> f64 {
        self.nodes[node].trust
    }

    pub fn energy(&self, node: NodeId) -> f64 {
        self.nodes[node].energy
    }

    /// Set trust, clamped to `[0, 1]`. Returns the stored value.
    pub fn set_trust(&mut self, node: NodeId, trust: f64) -> f64 {
        let trust = clamp(trust, MIN_TRUST, MAX_TRUST);
        self.nodes[node].trust = trust;
        trust
    }

    /// Shift trust by `delta`, saturating at the range bounds
    pub fn adjust_trust(&mut self, node: NodeId, delta: f64) -> f64 {
        let trust = self.nodes[node].trust + delta;
        self.set_trust(node, trust)
    }

    /// Set energy, clamped to `[0, 100]`. Returns the stored value.
    pub fn set_energy(&mut self, node: NodeId, energy: f64) -> f64 {
        let energy = clamp(energy, MIN_ENERGY, MAX_ENERGY);
        self.nodes[node].energy = energy;
        energy
    }

    /// Spend `amount` energy, never going below zero. Negative amounts are
    /// ignored so energy stays non-increasing.
    pub fn drain_energy(&mut self, node: NodeId, amount: f64) -> f64 {
        let energy = self.nodes[node].energy - amount.max(0.0);
        self.set_energy(node, energy)
    }

    pub fn record_sent(&mut self, node: NodeId) {
        self.nodes[node].packets_sent += 1;
    }

    pub fn record_received(&mut self, node: NodeId) {
        self.nodes[node].packets_received += 1;
    }

    pub fn record_dropped(&mut self, node: NodeId) {
        self.nodes[node].packets_dropped += 1;
    }

    pub fn totals(&self) -> PacketTotals {
        self.nodes.iter().fold(PacketTotals::default(), |acc, n| PacketTotals {
            sent: acc.sent + n.packets_sent,
            received: acc.received + n.packets_received,
            dropped: acc.dropped + n.packets_dropped,
        })
    }
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return min;
    }
    value.clamp(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_initialize_defaults() {
        let topology = Topology::from_edges(30, &[(0, 1)]).unwrap();
        let store = NodeStateStore::initialize(&topology, &mut StdRng::from_seed([1u8; 32]));

        assert_eq!(store.len(), 30);
        for (_, node) in store.iter() {
            assert_eq!(node.trust(), 1.0);
            assert_eq!(node.energy(), 100.0);
            assert_eq!(node.packets_sent(), 0);
            assert_eq!(node.packets_received(), 0);
            assert_eq!(node.packets_dropped(), 0);
        }
    }

    #[test]
    fn test_roles_cover_all_variants() {
        let topology = Topology::from_edges(300, &[]).unwrap();
        let store = NodeStateStore::initialize(&topology, &mut StdRng::from_seed([2u8; 32]));

        for role in Role::ALL {
            let count = store.iter().filter(|(_, n)| n.role() == role).count();
            // uniform over 3 roles: ~100 each
            assert!(count > 60 && count < 140, "{} drawn {} times", role, count);
        }
    }

    #[test]
    fn test_from_roles() {
        let store = NodeStateStore::from_roles(&[Role::Malicious, Role::Honest]).unwrap();
        assert_eq!(store.role(0), Role::Malicious);
        assert_eq!(store.role(1), Role::Honest);
        assert!(store.get(2).is_none());

        assert!(NodeStateStore::from_roles(&[]).is_err());
    }

    #[test]
    fn test_trust_is_clamped() {
        let mut store = NodeStateStore::from_roles(&[Role::Honest]).unwrap();

        assert_eq!(store.set_trust(0, 1.7), 1.0);
        assert_eq!(store.set_trust(0, -3.0), 0.0);
        assert_eq!(store.set_trust(0, f64::NAN), 0.0);
        assert_eq!(store.adjust_trust(0, 0.25), 0.25);
        assert_eq!(store.adjust_trust(0, -1.0), 0.0);
    }

    #[test]
    fn test_energy_is_clamped_and_drains_only_down() {
        let mut store = NodeStateStore::from_roles(&[Role::Selfish]).unwrap();

        assert_eq!(store.drain_energy(0, 40.0), 60.0);
        assert_eq!(store.drain_energy(0, -10.0), 60.0);
        assert_eq!(store.drain_energy(0, 500.0), 0.0);
        assert_eq!(store.set_energy(0, 250.0), 100.0);
    }

    #[test]
    fn test_mutation_is_isolated_per_node() {
        let mut store =
            NodeStateStore::from_roles(&[Role::Honest, Role::Selfish, Role::Malicious]).unwrap();
        let before = store.clone();

        store.set_trust(1, 0.2);
        store.drain_energy(1, 5.0);
        store.record_sent(1);
        store.record_dropped(1);

        assert_eq!(store.get(0), before.get(0));
        assert_eq!(store.get(2), before.get(2));
        assert_ne!(store.get(1), before.get(1));
    }

    #[test]
    fn test_totals() {
        let mut store = NodeStateStore::from_roles(&[Role::Honest, Role::Selfish]).unwrap();
        store.record_sent(0);
        store.record_received(1);
        store.record_sent(1);
        store.record_dropped(1);

        assert_eq!(
            store.totals(),
            PacketTotals {
                sent: 2,
                received: 1,
                dropped: 1,
            }
        );
    }
}
