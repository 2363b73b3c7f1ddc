// Behavior Policy
//
// Maps a node role to the outcome of one forwarding attempt. Reads nothing
// but the role and the injected random source.

use rand::Rng;

use crate::cnt_interface::Role;

impl Role {
    /// Probability that a node of this role delivers a packet
    pub fn success_probability(&self) -> f64 {
        match self {
            Role::Honest => 1.0,
            // drops 40% to conserve energy
            Role::Selfish => 0.6,
            // drops 80% to disrupt the network
            Role::Malicious => 0.2,
        }
    }
}

/// Attempt to forward one packet; `true` if delivered
pub fn attempt<R: Rng>(role: Role, rng: &mut R) -> bool {
    match role {
        // no draw: honest nodes always deliver
        Role::Honest => true,
        Role::Selfish | Role::Malicious => rng.gen_bool(role.success_probability()),
    }
}
