// Simulation Configuration

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::cnt_error::{Result, SimError};
use crate::cnt_interface::{
    DEFAULT_EDGE_PROBABILITY, DEFAULT_NODE_COUNT, DEFAULT_STEP_COUNT,
    DEFAULT_SUSPICION_THRESHOLD, MAX_NODE_COUNT,
};

/// Main simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of nodes in the topology
    pub node_count: usize,

    /// Probability that any unordered node pair is linked
    pub edge_probability: f64,

    /// Number of budgeted steps in one run
    pub step_count: usize,

    /// Trust strictly below this marks a node as suspicious
    pub suspicion_threshold: f64,

    /// How steps with an isolated sender are accounted
    pub skip_policy: SkipPolicy,

    /// Random seed (None = derive from phrase or generate)
    pub seed: Option<[u8; 32]>,

    /// Human-readable seed, hashed into a 32 byte seed
    pub seed_phrase: Option<String>,
}

/// Accounting of steps whose sender has no neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipPolicy {
    /// A no-op step still consumes one step of the budget
    #[default]
    CountsTowardBudget,
    /// Redraw the sender until a packet event occurs (bounded)
    Redraw,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            node_count: DEFAULT_NODE_COUNT,
            edge_probability: DEFAULT_EDGE_PROBABILITY,
            step_count: DEFAULT_STEP_COUNT,
            suspicion_threshold: DEFAULT_SUSPICION_THRESHOLD,
            skip_policy: SkipPolicy::default(),
            seed: None,
            seed_phrase: None,
        }
    }
}

impl SimConfig {
    /// Parse a configuration from YAML text. Missing fields take defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: SimConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_node_count(self.node_count)?;
        validate_probability("edge_probability", self.edge_probability)?;
        validate_probability("suspicion_threshold", self.suspicion_threshold)?;
        if self.step_count == 0 {
            return Err(SimError::invalid("step_count", "must be at least 1"));
        }
        Ok(())
    }

    /// Get or generate seed
    pub fn resolve_seed(&self) -> [u8; 32] {
        if let Some(seed) = self.seed {
            return seed;
        }
        if let Some(phrase) = &self.seed_phrase {
            return seed_from_phrase(phrase);
        }
        let mut temp_rng = StdRng::from_entropy();
        let mut seed = [0u8; 32];
        temp_rng.fill_bytes(&mut seed);
        seed
    }
}

/// Derive a 32 byte RNG seed from a phrase: Blake3(phrase)
pub fn seed_from_phrase(phrase: &str) -> [u8; 32] {
    *blake3::hash(phrase.as_bytes()).as_bytes()
}

pub(crate) fn validate_node_count(node_count: usize) -> Result<()> {
    if node_count < 1 || node_count > MAX_NODE_COUNT {
        return Err(SimError::invalid(
            "node_count",
            format!("{} not in 1..={}", node_count, MAX_NODE_COUNT),
        ));
    }
    Ok(())
}

pub(crate) fn validate_probability(name: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        // NaN fails the range check as well
        return Err(SimError::invalid(name, format!("{} not in [0, 1]", value)));
    }
    Ok(())
}
