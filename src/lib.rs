//! # cnt-sim - Cooperative Node Trust Simulator
//!
//! Trust and reputation based misbehavior detection for ad-hoc networks.
//! A fixed population of nodes exchanges packets over a random topology; each
//! node follows a hidden role (honest, selfish or malicious) and an observer
//! infers trustworthiness purely from packet outcomes and energy use, flagging
//! nodes whose trust falls below a threshold.
//!
//! ## Core Components
//!
//! - **Topology**: undirected random graph, fixed for a run
//! - **NodeStateStore**: role, trust, energy and packet counters per node
//! - **Behavior policy**: role -> delivery probability
//! - **Step engine**: one sender -> receiver attempt per step
//! - **Trust updater**: +0.05 on delivery, -0.10 on drop, energy cost per attempt
//! - **Classifier**: nodes with trust strictly below the threshold
//!
//! ## Usage
//!
//! ```no_run
//! use cnt_sim::{SimConfig, SimEngine};
//!
//! let config = SimConfig {
//!     node_count: 12,
//!     seed: Some([42u8; 32]),
//!     ..Default::default()
//! };
//!
//! let mut engine = SimEngine::new(config)?;
//! let result = engine.run();
//! println!("suspicious: {:?}", result.final_snapshot.suspicious);
//! # Ok::<(), cnt_sim::SimError>(())
//! ```
//!
//! Rendering (graph drawings, tables, reports) is left to the caller; see
//! `cnt_snapshot` for the data handed out and `simulator/` for a console
//! front-end.

pub mod cnt_interface;
pub mod cnt_error;
pub mod cnt_config;
pub mod cnt_topology;
pub mod cnt_state;
pub mod cnt_behavior;
pub mod cnt_trust;
pub mod cnt_classifier;
pub mod cnt_engine;
pub mod cnt_snapshot;

// Re-export commonly used types
pub use cnt_classifier::{suspicious, DetectionStats};
pub use cnt_config::{seed_from_phrase, SimConfig, SkipPolicy};
pub use cnt_engine::{step, SimEngine, SimResult, StepRecord};
pub use cnt_error::{Result, SimError};
pub use cnt_interface::{Event, EventSink, NoOpSink, NodeId, Role, StepIndex, StepOutcome};
pub use cnt_snapshot::{NetworkSnapshot, NodeRow, TrustBand};
pub use cnt_state::{NodeState, NodeStateStore, PacketTotals};
pub use cnt_topology::Topology;
