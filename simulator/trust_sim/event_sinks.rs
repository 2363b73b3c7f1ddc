//! Various event sinks for different use cases

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::rc::Rc;

use cnt_sim::{Event, EventSink, NodeId, StepIndex};

// ============================================================================
// Console Logging Sink
// ============================================================================

/// Event sink that prints one line per event
pub struct ConsoleEventSink {
    enabled: bool,
}

impl ConsoleEventSink {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl EventSink for ConsoleEventSink {
    fn log(&mut self, step: StepIndex, event: Event) {
        if !self.enabled {
            return;
        }

        // Format: step event_type details
        match event {
            Event::PacketForwarded { sender, receiver } => {
                println!("{:>5} Forwarded     {:>3} -> {:<3} ✓", step, sender, receiver);
            }
            Event::PacketDropped { sender, receiver } => {
                println!("{:>5} Dropped       {:>3} -> {:<3} ✗", step, sender, receiver);
            }
            Event::NoNeighbors { sender } => {
                println!("{:>5} NoNeighbors   {:>3}", step, sender);
            }
            Event::NodeFlagged { node, trust } => {
                println!("{:>5} Flagged       {:>3} trust:{:.2}", step, node, trust);
            }
            Event::NodeCleared { node, trust } => {
                println!("{:>5} Cleared       {:>3} trust:{:.2}", step, node, trust);
            }
            Event::EnergyDepleted { node } => {
                println!("{:>5} Depleted      {:>3}", step, node);
            }
        }
    }
}

// ============================================================================
// CSV Event Sink
// ============================================================================

/// CSV event sink for structured data export
pub struct CsvEventSink {
    writer: BufWriter<File>,
}

impl CsvEventSink {
    pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "step,event_type,node,related_node,trust")?;

        Ok(Self { writer })
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

impl EventSink for CsvEventSink {
    fn log(&mut self, step: StepIndex, event: Event) {
        let result = match event {
            Event::PacketForwarded { sender, receiver } => {
                writeln!(self.writer, "{},PacketForwarded,{},{},", step, sender, receiver)
            }
            Event::PacketDropped { sender, receiver } => {
                writeln!(self.writer, "{},PacketDropped,{},{},", step, sender, receiver)
            }
            Event::NoNeighbors { sender } => {
                writeln!(self.writer, "{},NoNeighbors,{},,", step, sender)
            }
            Event::NodeFlagged { node, trust } => {
                writeln!(self.writer, "{},NodeFlagged,{},,{:.4}", step, node, trust)
            }
            Event::NodeCleared { node, trust } => {
                writeln!(self.writer, "{},NodeCleared,{},,{:.4}", step, node, trust)
            }
            Event::EnergyDepleted { node } => {
                writeln!(self.writer, "{},EnergyDepleted,{},,", step, node)
            }
        };

        if let Err(e) = result {
            log::error!("Error writing to CSV: {}", e);
        }
    }
}

impl Drop for CsvEventSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

// ============================================================================
// Collector Event Sink (In-Memory)
// ============================================================================

/// Collects events in memory for programmatic analysis.
///
/// The engine owns its sink, so the collector hands out a shared handle the
/// caller keeps for reading after the run.
#[derive(Clone, Default)]
pub struct CollectorEventSink {
    events: Rc<RefCell<Vec<EventRecord>>>,
}

#[derive(Debug, Clone)]
pub struct EventRecord {
    pub step: StepIndex,
    pub event: Event,
}

impl CollectorEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EventRecord> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    // Query helpers
    pub fn flagged(&self) -> Vec<EventRecord> {
        self.filtered(|e| matches!(e.event, Event::NodeFlagged { .. }))
    }

    pub fn for_node(&self, node: NodeId) -> Vec<EventRecord> {
        self.filtered(|e| event_node(&e.event) == node)
    }

    pub fn in_step_range(&self, start: StepIndex, end: StepIndex) -> Vec<EventRecord> {
        self.filtered(|e| e.step >= start && e.step <= end)
    }

    fn filtered<F: Fn(&EventRecord) -> bool>(&self, keep: F) -> Vec<EventRecord> {
        self.events
            .borrow()
            .iter()
            .filter(|e| keep(*e))
            .cloned()
            .collect()
    }

    pub fn count_by_type(&self) -> EventTypeCounts {
        let mut counts = EventTypeCounts::default();
        for record in self.events.borrow().iter() {
            match record.event {
                Event::PacketForwarded { .. } => counts.forwarded += 1,
                Event::PacketDropped { .. } => counts.dropped += 1,
                Event::NoNeighbors { .. } => counts.no_neighbors += 1,
                Event::NodeFlagged { .. } => counts.flagged += 1,
                Event::NodeCleared { .. } => counts.cleared += 1,
                Event::EnergyDepleted { .. } => counts.depleted += 1,
            }
        }
        counts
    }

    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let mut csv_sink = CsvEventSink::new(path)?;
        for record in self.events.borrow().iter() {
            csv_sink.log(record.step, record.event.clone());
        }
        csv_sink.flush()
    }
}

/// The node an event is about (the sender for packet events)
fn event_node(event: &Event) -> NodeId {
    match *event {
        Event::PacketForwarded { sender, .. }
        | Event::PacketDropped { sender, .. }
        | Event::NoNeighbors { sender } => sender,
        Event::NodeFlagged { node, .. }
        | Event::NodeCleared { node, .. }
        | Event::EnergyDepleted { node } => node,
    }
}

#[derive(Debug, Default)]
pub struct EventTypeCounts {
    pub forwarded: usize,
    pub dropped: usize,
    pub no_neighbors: usize,
    pub flagged: usize,
    pub cleared: usize,
    pub depleted: usize,
}

impl EventSink for CollectorEventSink {
    fn log(&mut self, step: StepIndex, event: Event) {
        self.events.borrow_mut().push(EventRecord { step, event });
    }
}

// ============================================================================
// Multi Sink (Combine Multiple Sinks)
// ============================================================================

/// Combines multiple event sinks
pub struct MultiEventSink {
    sinks: Vec<Box<dyn EventSink>>,
}

impl MultiEventSink {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn add_sink(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }
}

impl EventSink for MultiEventSink {
    fn log(&mut self, step: StepIndex, event: Event) {
        for sink in &mut self.sinks {
            sink.log(step, event.clone());
        }
    }
}
