// Step Engine and Simulation Runner

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cnt_behavior::attempt;
use crate::cnt_classifier::{suspicious, DetectionStats};
use crate::cnt_config::{SimConfig, SkipPolicy};
use crate::cnt_error::Result;
use crate::cnt_interface::{Event, EventSink, NoOpSink, NodeId, StepIndex, StepOutcome};
use crate::cnt_snapshot::NetworkSnapshot;
use crate::cnt_state::NodeStateStore;
use crate::cnt_topology::Topology;
use crate::cnt_trust;

/// Redraw attempts per node before a `Redraw` step gives up
const REDRAWS_PER_NODE: usize = 64;

/// Result of drawing one step
enum StepDraw {
    Outcome(StepOutcome),
    /// drawn sender had no neighbors
    Isolated(NodeId),
}

/// Execute one step: draw a sender, draw one of its neighbors as receiver,
/// apply the sender's behavior policy and update counters, trust and energy.
///
/// Returns `None` when the drawn sender has no neighbors; nothing is mutated
/// in that case.
///
/// `store` must hold exactly the nodes of `topology`.
pub fn step<R: Rng>(
    topology: &Topology,
    store: &mut NodeStateStore,
    rng: &mut R,
) -> Option<StepOutcome> {
    match draw_step(topology, store, rng) {
        StepDraw::Outcome(outcome) => Some(outcome),
        StepDraw::Isolated(_) => None,
    }
}

fn draw_step<R: Rng>(topology: &Topology, store: &mut NodeStateStore, rng: &mut R) -> StepDraw {
    let sender = rng.gen_range(0..topology.node_count());

    let degree = topology.degree(sender);
    let receiver = match degree {
        0 => None,
        _ => topology.neighbor_at(sender, rng.gen_range(0..degree)),
    };
    let Some(receiver) = receiver else {
        return StepDraw::Isolated(sender);
    };

    let success = attempt(store.role(sender), rng);

    store.record_sent(sender);
    if success {
        store.record_received(receiver);
    } else {
        store.record_dropped(sender);
    }

    cnt_trust::update(store, sender, success, rng);

    StepDraw::Outcome(StepOutcome {
        sender,
        receiver,
        success,
    })
}

/// One budgeted step of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepRecord {
    pub step: StepIndex,
    /// `None` for a no-op step (isolated sender)
    pub outcome: Option<StepOutcome>,
}

/// Outcome of a complete run
#[derive(Debug, Clone)]
pub struct SimResult {
    pub seed_used: [u8; 32],
    pub steps_run: usize,
    /// Steps that produced a packet event
    pub outcomes: usize,
    /// Steps that drew an isolated sender
    pub skipped: usize,
    pub final_snapshot: NetworkSnapshot,
    /// Step at which each node was first flagged suspicious
    pub first_flagged: BTreeMap<NodeId, StepIndex>,
    pub detection: DetectionStats,
}

/// Simulation runner owning one topology, its node state and the random
/// source. Independent runs never share any of these.
pub struct SimEngine {
    config: SimConfig,
    rng: StdRng,
    seed_used: [u8; 32],
    topology: Topology,
    store: NodeStateStore,
    history: Vec<StepRecord>,

    // detection tracking
    flagged: BTreeSet<NodeId>,
    depleted: BTreeSet<NodeId>,
    first_flagged: BTreeMap<NodeId, StepIndex>,

    sink: Box<dyn EventSink>,
}

impl SimEngine {
    /// Build topology and node state from `config`.
    ///
    /// # Errors
    /// * `InvalidParameter` if any configuration value is out of domain; no
    ///   state is created in that case
    pub fn new(config: SimConfig) -> Result<Self> {
        Self::with_sink(config, Box::new(NoOpSink))
    }

    pub fn with_sink(config: SimConfig, sink: Box<dyn EventSink>) -> Result<Self> {
        config.validate()?;

        let seed = config.resolve_seed();
        let mut rng = StdRng::from_seed(seed);

        let topology = Topology::generate(config.node_count, config.edge_probability, &mut rng)?;
        let store = NodeStateStore::initialize(&topology, &mut rng);

        info!(
            "simulation ready: {} nodes, {} edges, {} steps, seed {:?}",
            topology.node_count(),
            topology.edge_count(),
            config.step_count,
            seed
        );

        Ok(Self {
            config,
            rng,
            seed_used: seed,
            topology,
            store,
            history: Vec::new(),
            flagged: BTreeSet::new(),
            depleted: BTreeSet::new(),
            first_flagged: BTreeMap::new(),
            sink,
        })
    }

    pub fn set_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sink = sink;
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed_used(&self) -> [u8; 32] {
        self.seed_used
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn store(&self) -> &NodeStateStore {
        &self.store
    }

    /// Every budgeted step so far, in order
    pub fn history(&self) -> &[StepRecord] {
        &self.history
    }

    pub fn steps_run(&self) -> usize {
        self.history.len()
    }

    pub fn is_finished(&self) -> bool {
        self.history.len() >= self.config.step_count
    }

    pub fn last_outcome(&self) -> Option<StepOutcome> {
        self.history.last().and_then(|record| record.outcome)
    }

    /// Current suspicious set; callable at any point of the run
    pub fn suspicious(&self) -> BTreeSet<NodeId> {
        suspicious(&self.store, self.config.suspicion_threshold)
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot::capture(
            &self.topology,
            &self.store,
            self.last_outcome(),
            self.config.suspicion_threshold,
            self.steps_run(),
        )
    }

    /// Run all remaining budgeted steps and return the results
    pub fn run(&mut self) -> SimResult {
        while !self.is_finished() {
            self.step();
        }

        let result = self.build_result();
        info!(
            "simulation complete: {} steps, {} outcomes, {} skipped, suspicious {:?}",
            result.steps_run, result.outcomes, result.skipped, result.final_snapshot.suspicious
        );
        result
    }

    /// Advance one budgeted step. Steps past the configured budget are
    /// allowed; `run` simply stops at the budget.
    pub fn step(&mut self) -> Option<StepOutcome> {
        let index = self.history.len();
        let outcome = self.draw_budgeted(index);

        if let Some(outcome) = outcome {
            self.observe(index, outcome);
        }

        self.history.push(StepRecord {
            step: index,
            outcome,
        });
        outcome
    }

    fn draw_budgeted(&mut self, index: StepIndex) -> Option<StepOutcome> {
        let attempts = match self.config.skip_policy {
            SkipPolicy::CountsTowardBudget => 1,
            SkipPolicy::Redraw if self.topology.edge_count() == 0 => 1,
            SkipPolicy::Redraw => self.topology.node_count() * REDRAWS_PER_NODE,
        };

        for _ in 0..attempts {
            match draw_step(&self.topology, &mut self.store, &mut self.rng) {
                StepDraw::Outcome(outcome) => return Some(outcome),
                StepDraw::Isolated(sender) => {
                    trace!("{}: node {} has no neighbors", index, sender);
                    self.sink.log(index, Event::NoNeighbors { sender });
                }
            }
        }

        None
    }

    fn observe(&mut self, index: StepIndex, outcome: StepOutcome) {
        let StepOutcome {
            sender,
            receiver,
            success,
        } = outcome;
        let trust = self.store.trust(sender);

        debug!("{}: {} trust:{:.2}", index, outcome, trust);

        let event = if success {
            Event::PacketForwarded { sender, receiver }
        } else {
            Event::PacketDropped { sender, receiver }
        };
        self.sink.log(index, event);

        if self.store.energy(sender) <= 0.0 && self.depleted.insert(sender) {
            warn!("{}: node {} ran out of energy", index, sender);
            self.sink.log(index, Event::EnergyDepleted { node: sender });
        }

        // only the sender's trust moved this step
        let below = trust < self.config.suspicion_threshold;
        if below && self.flagged.insert(sender) {
            warn!("{}: node {} flagged suspicious (trust {:.2})", index, sender, trust);
            self.first_flagged.entry(sender).or_insert(index);
            self.sink.log(index, Event::NodeFlagged { node: sender, trust });
        } else if !below && self.flagged.remove(&sender) {
            info!("{}: node {} cleared (trust {:.2})", index, sender, trust);
            self.sink.log(index, Event::NodeCleared { node: sender, trust });
        }
    }

    fn build_result(&self) -> SimResult {
        let outcomes = self
            .history
            .iter()
            .filter(|record| record.outcome.is_some())
            .count();
        let final_snapshot = self.snapshot();
        let detection = DetectionStats::evaluate(&self.store, &final_snapshot.suspicious);

        SimResult {
            seed_used: self.seed_used,
            steps_run: self.history.len(),
            outcomes,
            skipped: self.history.len() - outcomes,
            final_snapshot,
            first_flagged: self.first_flagged.clone(),
            detection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnt_interface::Role;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct SharedSink(Rc<RefCell<Vec<(StepIndex, Event)>>>);

    impl EventSink for SharedSink {
        fn log(&mut self, step: StepIndex, event: Event) {
            self.0.borrow_mut().push((step, event));
        }
    }

    fn seeded(seed: u8, node_count: usize, step_count: usize) -> SimConfig {
        SimConfig {
            node_count,
            step_count,
            seed: Some([seed; 32]),
            ..Default::default()
        }
    }

    fn assert_conserved(store: &NodeStateStore) {
        let totals = store.totals();
        assert_eq!(totals.received + totals.dropped, totals.sent);
    }

    #[test]
    fn test_invalid_config_fails_construction() {
        let config = SimConfig {
            edge_probability: 1.2,
            ..Default::default()
        };
        assert!(SimEngine::new(config).is_err());
    }

    #[test]
    fn test_run_consumes_full_budget() {
        let mut engine = SimEngine::new(seeded(1, 10, 50)).unwrap();

        let result = engine.run();

        assert_eq!(result.steps_run, 50);
        assert_eq!(result.outcomes + result.skipped, 50);
        assert_eq!(engine.history().len(), 50);
        assert!(engine.is_finished());
        for (i, record) in engine.history().iter().enumerate() {
            assert_eq!(record.step, i);
        }
    }

    #[test]
    fn test_invariants_hold_every_step() {
        let mut engine = SimEngine::new(seeded(2, 20, 500)).unwrap();
        let roles: Vec<Role> = engine.store().iter().map(|(_, n)| n.role()).collect();
        let mut previous = engine.store().clone();

        while !engine.is_finished() {
            engine.step();
            let store = engine.store();

            for (id, node) in store.iter() {
                let before = previous.get(id).unwrap();
                assert!((0.0..=1.0).contains(&node.trust()));
                assert!((0.0..=100.0).contains(&node.energy()));
                assert!(node.energy() <= before.energy());
                assert!(node.packets_sent() >= before.packets_sent());
                assert!(node.packets_received() >= before.packets_received());
                assert!(node.packets_dropped() >= before.packets_dropped());
                assert_eq!(node.role(), roles[id]);
            }
            assert_conserved(store);
            previous = store.clone();
        }
    }

    #[test]
    fn test_outcome_follows_topology() {
        let mut engine = SimEngine::new(seeded(3, 12, 300)).unwrap();
        engine.run();

        for record in engine.history() {
            if let Some(outcome) = record.outcome {
                assert!(engine.topology().contains_edge(outcome.sender, outcome.receiver));
                if engine.store().role(outcome.sender) == Role::Honest {
                    assert!(outcome.success);
                }
            }
        }
    }

    #[test]
    fn test_no_neighbors_is_silent_no_op() {
        let config = SimConfig {
            edge_probability: 0.0,
            ..seeded(4, 8, 100)
        };
        let mut engine = SimEngine::new(config).unwrap();
        let initial = engine.store().clone();

        let result = engine.run();

        assert_eq!(result.outcomes, 0);
        assert_eq!(result.skipped, 100);
        assert_eq!(engine.store(), &initial);
        assert_eq!(result.final_snapshot.totals.sent, 0);
        assert!(result.final_snapshot.suspicious.is_empty());
    }

    #[test]
    fn test_redraw_with_no_edges_terminates() {
        let config = SimConfig {
            edge_probability: 0.0,
            skip_policy: SkipPolicy::Redraw,
            ..seeded(5, 8, 20)
        };
        let mut engine = SimEngine::new(config).unwrap();

        let result = engine.run();

        assert_eq!(result.steps_run, 20);
        assert_eq!(result.outcomes, 0);
    }

    #[test]
    fn test_redraw_produces_outcome_every_step() {
        let config = SimConfig {
            edge_probability: 0.1,
            skip_policy: SkipPolicy::Redraw,
            ..seeded(6, 20, 200)
        };
        let mut engine = SimEngine::new(config).unwrap();
        assert!(engine.topology().edge_count() > 0);

        let result = engine.run();

        assert_eq!(result.outcomes, 200);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.final_snapshot.totals.sent, 200);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = SimEngine::new(seeded(7, 15, 200)).unwrap();
        let mut b = SimEngine::new(seeded(7, 15, 200)).unwrap();

        let result_a = a.run();
        let result_b = b.run();

        assert_eq!(a.topology(), b.topology());
        assert_eq!(a.history(), b.history());
        assert_eq!(a.store(), b.store());
        assert_eq!(result_a.final_snapshot, result_b.final_snapshot);
        assert_eq!(result_a.seed_used, [7u8; 32]);
    }

    #[test]
    fn test_seed_phrase_run_is_reproducible() {
        let config = SimConfig {
            seed_phrase: Some("replay".to_string()),
            ..Default::default()
        };
        let mut a = SimEngine::new(config.clone()).unwrap();
        let mut b = SimEngine::new(config).unwrap();

        a.run();
        b.run();

        assert_eq!(a.seed_used(), b.seed_used());
        assert_eq!(a.history(), b.history());
    }

    #[test]
    fn test_free_step_trust_response() {
        let topology = Topology::from_edges(2, &[(0, 1)]).unwrap();
        let mut store = NodeStateStore::from_roles(&[Role::Malicious, Role::Selfish]).unwrap();
        let mut rng = StdRng::from_seed([8u8; 32]);

        for _ in 0..300 {
            let before = store.clone();
            let outcome = step(&topology, &mut store, &mut rng).unwrap();
            let sender = outcome.sender;

            let old = before.trust(sender);
            let new = store.trust(sender);
            if outcome.success {
                assert!(new > old || new == 1.0, "success {} -> {}", old, new);
                assert_eq!(store.get(outcome.receiver).unwrap().packets_received(),
                    before.get(outcome.receiver).unwrap().packets_received() + 1);
            } else {
                assert!(new < old || new == 0.0, "failure {} -> {}", old, new);
                assert_eq!(store.get(sender).unwrap().packets_dropped(),
                    before.get(sender).unwrap().packets_dropped() + 1);
            }
            assert_eq!(store.get(sender).unwrap().packets_sent(),
                before.get(sender).unwrap().packets_sent() + 1);
            // the receiver's trust never moves
            assert_eq!(store.trust(outcome.receiver), before.trust(outcome.receiver));
        }
    }

    #[test]
    fn test_free_step_isolated_sender() {
        let topology = Topology::from_edges(1, &[]).unwrap();
        let mut store = NodeStateStore::from_roles(&[Role::Selfish]).unwrap();
        let before = store.clone();
        let mut rng = StdRng::from_seed([9u8; 32]);

        assert_eq!(step(&topology, &mut store, &mut rng), None);
        assert_eq!(store, before);
    }

    #[test]
    fn test_events_and_flagging() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let mut engine =
            SimEngine::with_sink(seeded(10, 10, 400), Box::new(SharedSink(events.clone()))).unwrap();

        let result = engine.run();
        let events = events.borrow();

        let packets = events
            .iter()
            .filter(|(_, e)| {
                matches!(e, Event::PacketForwarded { .. } | Event::PacketDropped { .. })
            })
            .count();
        assert_eq!(packets, result.outcomes);

        let dropped = events
            .iter()
            .filter(|(_, e)| matches!(e, Event::PacketDropped { .. }))
            .count() as u64;
        assert_eq!(dropped, result.final_snapshot.totals.dropped);

        for node in &result.final_snapshot.suspicious {
            assert!(result.first_flagged.contains_key(node));
        }
        for (node, step) in &result.first_flagged {
            assert!(events.iter().any(|(s, e)| {
                s == step && matches!(e, Event::NodeFlagged { node: n, .. } if n == node)
            }));
        }
    }

    #[test]
    fn test_snapshot_mid_run_matches_classifier() {
        let mut engine = SimEngine::new(seeded(11, 10, 100)).unwrap();
        for _ in 0..40 {
            engine.step();
        }

        let snapshot = engine.snapshot();

        assert_eq!(snapshot.steps_run, 40);
        assert_eq!(snapshot.suspicious, engine.suspicious());
        assert_eq!(snapshot.last_outcome, engine.last_outcome());
        assert!(!engine.is_finished());
    }

    #[test]
    fn test_independent_runs_do_not_share_state() {
        let mut a = SimEngine::new(seeded(12, 10, 100)).unwrap();
        let b = SimEngine::new(seeded(12, 10, 100)).unwrap();

        a.run();

        assert_eq!(b.steps_run(), 0);
        assert!(b.store().iter().all(|(_, n)| n.packets_sent() == 0 && n.trust() == 1.0));
    }
}
