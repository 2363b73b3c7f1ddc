//! Suspicious-node classifier.
//!
//! Instantaneous threshold over current trust: a node is suspicious when its
//! trust is strictly below the threshold. No windowing, no history.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::cnt_interface::{NodeId, Role};
use crate::cnt_state::NodeStateStore;

/// Every node whose trust is strictly below `threshold`
pub fn suspicious(store: &NodeStateStore, threshold: f64) -> BTreeSet<NodeId> {
    store
        .iter()
        .filter(|(_, node)| node.trust() < threshold)
        .map(|(id, _)| id)
        .collect()
}

/// Quality of a suspicious set measured against the hidden roles.
///
/// A positive is any node whose role is not `Honest`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DetectionStats {
    /// Misbehaving nodes that were flagged
    pub true_positives: usize,
    /// Honest nodes that were flagged
    pub false_positives: usize,
    /// Misbehaving nodes that were not flagged
    pub missed: usize,
    /// `tp / (tp + fp)`, 1.0 when nothing was flagged
    pub precision: f64,
    /// `tp / (tp + missed)`, 1.0 when nothing misbehaves
    pub recall: f64,
}

impl DetectionStats {
    pub fn evaluate(store: &NodeStateStore, flagged: &BTreeSet<NodeId>) -> Self {
        let mut stats = DetectionStats::default();

        for (id, node) in store.iter() {
            let misbehaving = node.role() != Role::Honest;
            match (misbehaving, flagged.contains(&id)) {
                (true, true) => stats.true_positives += 1,
                (false, true) => stats.false_positives += 1,
                (true, false) => stats.missed += 1,
                (false, false) => {}
            }
        }

        let tp = stats.true_positives as f64;
        stats.precision = ratio(tp, tp + stats.false_positives as f64);
        stats.recall = ratio(tp, tp + stats.missed as f64);
        stats
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        1.0
    } else {
        numerator / denominator
    }
}
