//! Timing-aware discrete-event cycle simulation.
//!
//! The [`TimingSimulator`] orchestrates one circuit: it derives the
//! propagation table from the contracted connection graph and the port
//! bindings, generates reproducible stimulus per cycle, and drains a
//! time-ordered event queue that advances component state through the
//! pure logic evaluator.
//!
//! Each cycle is atomic from the caller's perspective: the simulator is
//! `Idle` between cycles and `Draining` while a queue drain is in
//! progress, and a new cycle cannot start before the previous drain
//! completes. Propagation continues only on actual output changes,
//! bounded by a per-drain already-notified set; a non-settling
//! combinational cycle is cut off by the configured oscillation budget
//! and reported as a cycle-level failure.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bind::{PortBinder, PortBinding};
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::logic::{self, ComponentClass};
use crate::netlist::Netlist;
use crate::propagation::{classify_signal, PropagationTable, SignalClass};
use crate::simplify::{direct_connections, Connection, GraphSimplifier};
use crate::state::StateStore;
use crate::stimulus::StimulusGenerator;
use crate::types::{Cycle, PinIndex, SimTime};

static EMPTY_LABELS: BTreeMap<PinIndex, String> = BTreeMap::new();

/// A scheduled signal arrival.
///
/// Transient: events exist only inside one cycle's queue drain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalEvent {
    /// Component (or port pseudo-node) the signal arrives at
    pub component: String,
    /// Input pin the signal arrives at
    pub pin: PinIndex,
    pub wire: String,
    pub value: bool,
    /// Scheduled arrival time within the drain
    pub time: SimTime,
    pub class: SignalClass,
}

#[derive(Clone, Debug)]
struct QueuedEvent {
    event: SignalEvent,
    seq: u64,
}

impl PartialEq for QueuedEvent {
    fn eq(&self, other: &Self) -> bool {
        self.event.time == other.event.time && self.seq == other.seq
    }
}

impl Eq for QueuedEvent {}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse both keys so the earliest
        // arrival wins and equal times pop in insertion order.
        other
            .event
            .time
            .cmp(&self.event.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Time-ordered event queue with FIFO tie-break among equal times.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<QueuedEvent>,
    next_seq: u64,
    peak_depth: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: SignalEvent) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueuedEvent { event, seq });
        self.peak_depth = self.peak_depth.max(self.heap.len());
    }

    /// Pops the earliest arrival; equal times come out in push order.
    pub fn pop(&mut self) -> Option<SignalEvent> {
        self.heap.pop().map(|q| q.event)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Largest depth the queue reached since creation.
    pub fn peak_depth(&self) -> usize {
        self.peak_depth
    }
}

/// Outward notification of one propagated change.
///
/// Emitted exactly once per (source, destination, wire) per drain; the
/// rendering collaborator consumes these read-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalChange {
    pub wire: String,
    pub value: bool,
    pub arrival_time: SimTime,
    pub source: String,
    pub destination: String,
    pub class: SignalClass,
}

/// Result of one simulated cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CycleOutcome {
    pub cycle: Cycle,
    /// Events processed during the drain
    pub events_processed: u64,
    /// Notifications in emission order
    pub changes: Vec<SignalChange>,
    /// Name to primary-output-level snapshot after the drain
    pub outputs: BTreeMap<String, bool>,
}

/// Simulator lifecycle state. A cycle drain is atomic: `Draining` is
/// never observable from outside a `step` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimPhase {
    Idle,
    Draining,
}

/// Statistics accumulated across cycles.
#[derive(Clone, Debug, Default)]
pub struct SimStats {
    pub cycles_run: u64,
    pub failed_cycles: u64,
    pub events_processed: u64,
    pub notifications_emitted: u64,
    pub peak_queue_depth: usize,
}

#[derive(Clone, Debug)]
struct ComponentMeta {
    class: ComponentClass,
    /// Pin label (parser-preserved `port` label, else wire name) per
    /// input pin, feeding the clock/data resolution heuristics
    labels: BTreeMap<PinIndex, String>,
}

/// Discrete-event simulator for one netlist.
pub struct TimingSimulator {
    components: HashMap<String, ComponentMeta>,
    connections: Vec<Connection>,
    bindings: Vec<PortBinding>,
    table: PropagationTable,
    stimulus: StimulusGenerator,
    states: StateStore,
    config: SimConfig,
    phase: SimPhase,
    next_cycle: Cycle,
    stats: SimStats,
}

impl TimingSimulator {
    /// Builds a simulator with default configuration.
    pub fn new(netlist: &Netlist) -> Self {
        Self::with_config(netlist, SimConfig::default())
    }

    /// Builds a simulator from a netlist record.
    ///
    /// Connections come from graph contraction; when contraction yields
    /// nothing (no raw connections at all), the ground-filtered raw
    /// connections are used directly as the fallback strategy.
    pub fn with_config(netlist: &Netlist, config: SimConfig) -> Self {
        let mut connections = GraphSimplifier::new(netlist).simplify();
        if connections.is_empty() {
            debug!("contraction yielded no connections, using direct extraction");
            connections = direct_connections(netlist);
        }

        let bindings = PortBinder::new(netlist).bind_all();
        let table = PropagationTable::build(&connections, &bindings, netlist.delays(), &config);
        let stimulus = StimulusGenerator::new(netlist);

        let components = netlist
            .real_components()
            .into_iter()
            .map(|c| {
                let labels = c
                    .inputs
                    .iter()
                    .map(|p| {
                        let label = p.port.clone().unwrap_or_else(|| p.wire.clone());
                        (p.pin_index, label)
                    })
                    .collect();
                let meta = ComponentMeta {
                    class: logic::classify(&c.ty, &c.name),
                    labels,
                };
                (c.name.clone(), meta)
            })
            .collect();

        Self {
            components,
            connections,
            bindings,
            table,
            stimulus,
            states: StateStore::new(),
            config,
            phase: SimPhase::Idle,
            next_cycle: 0,
            stats: SimStats::default(),
        }
    }

    /// The contracted connection list feeding the propagation table.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// The de-duplicated port bindings.
    pub fn bindings(&self) -> &[PortBinding] {
        &self.bindings
    }

    /// Names of the real components known to the simulator.
    pub fn component_names(&self) -> impl Iterator<Item = &String> {
        self.components.keys()
    }

    /// The persistent component state map.
    pub fn states(&self) -> &StateStore {
        &self.states
    }

    /// Accumulated statistics.
    pub fn stats(&self) -> &SimStats {
        &self.stats
    }

    /// Current lifecycle state; `Idle` between cycles.
    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    /// Index of the next cycle to simulate.
    pub fn cycle(&self) -> Cycle {
        self.next_cycle
    }

    /// Simulates the next cycle and drains its event queue to completion.
    ///
    /// On [`SimError::OscillationBudgetExceeded`] the cycle is abandoned:
    /// component state is left as of the last processed event, the
    /// simulator returns to `Idle` and subsequent cycles may still run.
    pub fn step(&mut self) -> SimResult<CycleOutcome> {
        debug_assert_eq!(self.phase, SimPhase::Idle);

        let cycle = self.next_cycle;
        self.phase = SimPhase::Draining;
        let result = self.drain_cycle(cycle);
        self.phase = SimPhase::Idle;
        self.next_cycle += 1;

        if result.is_err() {
            self.stats.failed_cycles += 1;
        }
        result
    }

    /// Runs `cycles` consecutive cycles, strictly serialized: each drain
    /// completes before the next cycle starts.
    pub fn run(&mut self, cycles: u64) -> Vec<SimResult<CycleOutcome>> {
        (0..cycles).map(|_| self.step()).collect()
    }

    fn drain_cycle(&mut self, cycle: Cycle) -> SimResult<CycleOutcome> {
        let levels = self.stimulus.levels_for_cycle(cycle);
        let mut queue = EventQueue::new();
        let mut changes: Vec<SignalChange> = Vec::new();
        let mut notified: HashSet<(String, String, String)> = HashSet::new();

        // Record port levels as pseudo-node outputs and seed one arrival
        // per fan-out edge. Class offsets order coincident arrivals:
        // clock first, then data, then everything else.
        for (port, value) in &levels {
            self.states.state_mut(port).outputs.insert(0, *value);

            for edge in self.table.edges_from(port) {
                let offset = match edge.class {
                    SignalClass::Clock => 0,
                    SignalClass::Data => self.config.data_offset_ms,
                    SignalClass::Other => self.config.other_offset_ms,
                };
                let time = edge.delay + offset;
                notified.insert((
                    edge.source.clone(),
                    edge.destination.clone(),
                    edge.wire.clone(),
                ));
                queue.push(SignalEvent {
                    component: edge.destination.clone(),
                    pin: edge.dest_pin,
                    wire: edge.wire.clone(),
                    value: *value,
                    time,
                    class: edge.class,
                });
                changes.push(SignalChange {
                    wire: edge.wire.clone(),
                    value: *value,
                    arrival_time: time,
                    source: edge.source.clone(),
                    destination: edge.destination.clone(),
                    class: edge.class,
                });
            }
        }

        // Clock level each component carried into this cycle, sampled
        // when the component is first touched; rising-edge detection is
        // relative to this level even after the in-cycle clock arrives.
        let mut entry_clock: HashMap<String, bool> = HashMap::new();
        let mut processed: u64 = 0;

        while let Some(event) = queue.pop() {
            processed += 1;
            if processed > self.config.oscillation_budget {
                warn!(
                    cycle,
                    budget = self.config.oscillation_budget,
                    "oscillation budget exceeded, abandoning cycle"
                );
                self.stats.events_processed += processed - 1;
                self.stats.peak_queue_depth = self.stats.peak_queue_depth.max(queue.peak_depth());
                return Err(SimError::OscillationBudgetExceeded {
                    cycle,
                    events_processed: processed - 1,
                    budget: self.config.oscillation_budget,
                });
            }

            let (class, labels) = match self.components.get(&event.component) {
                Some(meta) => (meta.class, &meta.labels),
                None => (ComponentClass::Unknown, &EMPTY_LABELS),
            };

            let state = self.states.state_mut(&event.component);
            let prev_clock = *entry_clock
                .entry(event.component.clone())
                .or_insert(state.last_clock);

            state.inputs.insert(event.pin, event.value);
            if event.class == SignalClass::Clock
                || classify_signal(&event.wire) == SignalClass::Clock
            {
                state.last_clock = event.value;
            }

            let old_outputs = state.outputs.clone();
            let new_outputs =
                logic::evaluate(class, &state.inputs, labels, &old_outputs, prev_clock);
            state.outputs = new_outputs.clone();

            let output_changed = new_outputs
                .iter()
                .any(|(pin, value)| old_outputs.get(pin) != Some(value));
            if !output_changed {
                continue;
            }

            for edge in self.table.edges_from(&event.component) {
                let key = (
                    edge.source.clone(),
                    edge.destination.clone(),
                    edge.wire.clone(),
                );
                if !notified.insert(key) {
                    continue;
                }

                let value = new_outputs
                    .get(&edge.source_pin)
                    .or_else(|| new_outputs.get(&0))
                    .copied()
                    .unwrap_or(false);
                let time = event.time + edge.delay;
                queue.push(SignalEvent {
                    component: edge.destination.clone(),
                    pin: edge.dest_pin,
                    wire: edge.wire.clone(),
                    value,
                    time,
                    class: edge.class,
                });
                changes.push(SignalChange {
                    wire: edge.wire.clone(),
                    value,
                    arrival_time: time,
                    source: edge.source.clone(),
                    destination: edge.destination.clone(),
                    class: edge.class,
                });
            }
        }

        self.stats.cycles_run += 1;
        self.stats.events_processed += processed;
        self.stats.notifications_emitted += changes.len() as u64;
        self.stats.peak_queue_depth = self.stats.peak_queue_depth.max(queue.peak_depth());

        Ok(CycleOutcome {
            cycle,
            events_processed: processed,
            changes,
            outputs: self.states.snapshot(),
        })
    }

    /// Exports simulator statistics as JSON.
    pub fn export_stats(&self) -> serde_json::Value {
        serde_json::json!({
            "next_cycle": self.next_cycle,
            "phase": match self.phase {
                SimPhase::Idle => "idle",
                SimPhase::Draining => "draining",
            },
            "components": self.components.len(),
            "connections": self.connections.len(),
            "bindings": self.bindings.len(),
            "propagation_edges": self.table.len(),
            "cycles_run": self.stats.cycles_run,
            "failed_cycles": self.stats.failed_cycles,
            "events_processed": self.stats.events_processed,
            "notifications_emitted": self.stats.notifications_emitted,
            "peak_queue_depth": self.stats.peak_queue_depth,
        })
    }
}
