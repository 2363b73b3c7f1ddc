//! Random Network Topology
//!
//! Undirected Erdős–Rényi graph over `node_count` nodes: every unordered pair
//! is linked independently with `edge_probability`. Built once per run and
//! never mutated afterwards.

use indexmap::IndexSet;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cnt_config::{validate_node_count, validate_probability};
use crate::cnt_error::{Result, SimError};
use crate::cnt_interface::NodeId;

/// Immutable simple undirected graph
#[derive(Debug, Clone, PartialEq)]
pub struct Topology {
    // neighbors in insertion order, so seeded neighbor picks are reproducible
    adjacency: Vec<IndexSet<NodeId>>,
    edge_count: usize,
}

impl Topology {
    /// Generate a random topology from the given random source
    ///
    /// # Errors
    /// * `InvalidParameter` if `node_count` is not in `1..=MAX_NODE_COUNT` or
    ///   `edge_probability` is outside `[0, 1]`
    pub fn generate<R: Rng>(node_count: usize, edge_probability: f64, rng: &mut R) -> Result<Self> {
        validate_node_count(node_count)?;
        validate_probability("edge_probability", edge_probability)?;

        let mut topology = Self::empty(node_count);
        for a in 0..node_count {
            for b in (a + 1)..node_count {
                if rng.gen_bool(edge_probability) {
                    topology.link(a, b);
                }
            }
        }

        Ok(topology)
    }

    /// Generate with a private RNG; `None` seeds from entropy
    pub fn generate_seeded(
        node_count: usize,
        edge_probability: f64,
        seed: Option<[u8; 32]>,
    ) -> Result<Self> {
        let mut rng = match seed {
            Some(seed) => StdRng::from_seed(seed),
            None => StdRng::from_entropy(),
        };
        Self::generate(node_count, edge_probability, &mut rng)
    }

    /// Build a topology from an explicit edge list. Duplicate edges collapse
    /// into one, self-loops are rejected.
    pub fn from_edges(node_count: usize, edges: &[(NodeId, NodeId)]) -> Result<Self> {
        validate_node_count(node_count)?;

        let mut topology = Self::empty(node_count);
        for &(a, b) in edges {
            for node in [a, b] {
                if node >= node_count {
                    return Err(SimError::UnknownNode(node));
                }
            }
            if a == b {
                return Err(SimError::invalid(
                    "edges",
                    format!("self-loop on node {}", a),
                ));
            }
            topology.link(a, b);
        }

        Ok(topology)
    }

    fn empty(node_count: usize) -> Self {
        Self {
            adjacency: vec![IndexSet::new(); node_count],
            edge_count: 0,
        }
    }

    fn link(&mut self, a: NodeId, b: NodeId) {
        if self.adjacency[a].insert(b) {
            self.adjacency[b].insert(a);
            self.edge_count += 1;
        }
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Nodes in creation order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        0..self.adjacency.len()
    }

    /// Neighbors of `node` in link order
    ///
    /// # Panics
    /// If `node` is not in `0..node_count()`.
    pub fn neighbors(&self, node: NodeId) -> &IndexSet<NodeId> {
        &self.adjacency[node]
    }

    /// The `index`-th neighbor of `node`, if any
    pub fn neighbor_at(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.adjacency.get(node)?.get_index(index).copied()
    }

    pub fn degree(&self, node: NodeId) -> usize {
        self.adjacency.get(node).map_or(0, |set| set.len())
    }

    pub fn is_isolated(&self, node: NodeId) -> bool {
        self.degree(node) == 0
    }

    pub fn contains_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.adjacency.get(a).map_or(false, |set| set.contains(&b))
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Every edge once as `(low, high)`, ordered by `low` then insertion
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges = Vec::with_capacity(self.edge_count);
        for (a, neighbors) in self.adjacency.iter().enumerate() {
            for &b in neighbors {
                if a < b {
                    edges.push((a, b));
                }
            }
        }
        edges
    }
}
