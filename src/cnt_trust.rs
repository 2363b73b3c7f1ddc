// Trust & Energy Updater
//
// Applies the observer's rule to the sender of a completed step. A failure
// costs twice the trust a success earns; every attempt costs energy whether
// or not the packet was delivered.

use rand::Rng;

use crate::cnt_interface::{NodeId, ENERGY_COST_RANGE, TRUST_PENALTY, TRUST_REWARD};
use crate::cnt_state::NodeStateStore;

/// Update trust and energy of `sender` after one forwarding attempt
pub fn update<R: Rng>(store: &mut NodeStateStore, sender: NodeId, success: bool, rng: &mut R) {
    apply_trust(store, sender, success);
    spend_energy(store, sender, rng);
}

/// Reward or penalize `sender`, saturating at `[0, 1]`
pub fn apply_trust(store: &mut NodeStateStore, sender: NodeId, success: bool) -> f64 {
    let delta = if success { TRUST_REWARD } else { -TRUST_PENALTY };
    store.adjust_trust(sender, delta)
}

/// Charge the transmission cost to `sender`; returns the amount drawn
pub fn spend_energy<R: Rng>(store: &mut NodeStateStore, sender: NodeId, rng: &mut R) -> f64 {
    let cost = rng.gen_range(ENERGY_COST_RANGE);
    store.drain_energy(sender, cost);
    cost
}
