//! Propagation table construction and per-wire delay resolution.
//!
//! The propagation table is the static fan-out map the event queue walks
//! during a drain: for every source name (a component or a module input
//! port), the destinations one output change must be delivered to, the
//! wire carrying it and the wire's resolved delay.
//!
//! Delays come from the netlist's optional timing table: the first entry
//! whose instance name contains the wire name supplies the raw maximum
//! delay, which is scaled and clamped into a bounded millisecond range.
//! Unresolved wires get a fixed default.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::bind::PortBinding;
use crate::config::SimConfig;
use crate::netlist::DelayEntry;
use crate::simplify::Connection;
use crate::types::{PinIndex, SimTime};

/// Coarse signal classification used for arrival ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalClass {
    Clock,
    Data,
    Other,
}

/// Classifies a wire or port name.
pub fn classify_signal(name: &str) -> SignalClass {
    let name = name.to_lowercase();
    if name.contains("clk") || name.contains("clock") {
        SignalClass::Clock
    } else if name.contains('d') || name.contains("data") {
        SignalClass::Data
    } else {
        SignalClass::Other
    }
}

/// One fan-out edge of the propagation table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropagationEdge {
    pub source: String,
    /// Output pin of the source that drives this edge
    pub source_pin: PinIndex,
    pub destination: String,
    /// Input pin of the destination the signal arrives at
    pub dest_pin: PinIndex,
    pub wire: String,
    pub delay: SimTime,
    pub class: SignalClass,
}

/// Static fan-out map keyed by source name.
#[derive(Clone, Debug, Default)]
pub struct PropagationTable {
    edges: HashMap<String, Vec<PropagationEdge>>,
    edge_count: usize,
}

impl PropagationTable {
    /// Builds the table from simplified connections and port bindings.
    ///
    /// Every connection becomes an edge keyed by its source component.
    /// Input-direction bindings become edges keyed by the port name, so
    /// stimulus can be seeded from ports; output-direction bindings
    /// become edges keyed by the bound component targeting the port, so
    /// module outputs receive notifications.
    pub fn build(
        connections: &[Connection],
        bindings: &[PortBinding],
        delays: &[DelayEntry],
        config: &SimConfig,
    ) -> Self {
        let mut table = Self::default();

        for conn in connections {
            let delay = resolve_delay(&conn.wire, delays, config);
            table.push(PropagationEdge {
                source: conn.from.component.clone(),
                source_pin: conn.from.pin_index,
                destination: conn.to.component.clone(),
                dest_pin: conn.to.pin_index,
                wire: conn.wire.clone(),
                delay,
                class: classify_signal(&conn.wire),
            });
        }

        for binding in bindings {
            let delay = resolve_delay(&binding.wire, delays, config);
            if binding.direction.is_input() {
                table.push(PropagationEdge {
                    source: binding.port.clone(),
                    source_pin: 0,
                    destination: binding.component.clone(),
                    dest_pin: binding.pin_index,
                    wire: binding.wire.clone(),
                    delay,
                    // A port's class follows its own name, not the wire's.
                    class: classify_signal(&binding.port),
                });
            } else {
                table.push(PropagationEdge {
                    source: binding.component.clone(),
                    source_pin: binding.pin_index,
                    destination: binding.port.clone(),
                    dest_pin: 0,
                    wire: binding.wire.clone(),
                    delay,
                    class: classify_signal(&binding.wire),
                });
            }
        }

        table
    }

    fn push(&mut self, edge: PropagationEdge) {
        self.edges.entry(edge.source.clone()).or_default().push(edge);
        self.edge_count += 1;
    }

    /// Fan-out edges of one source, empty when the source drives nothing.
    pub fn edges_from(&self, source: &str) -> &[PropagationEdge] {
        self.edges.get(source).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of edges.
    pub fn len(&self) -> usize {
        self.edge_count
    }

    /// Returns true when the table has no edges.
    pub fn is_empty(&self) -> bool {
        self.edge_count == 0
    }
}

/// Resolves the propagation delay of one wire.
///
/// Substring match against the delay-table instance names, scaled and
/// clamped; the configured default when no entry matches or the entry
/// carries no usable delay.
pub fn resolve_delay(wire: &str, delays: &[DelayEntry], config: &SimConfig) -> SimTime {
    let raw = delays
        .iter()
        .find(|d| d.instance.contains(wire))
        .and_then(|d| d.max_delay)
        .filter(|&v| v > 0.0);

    match raw {
        Some(v) => {
            let scaled = (v * config.delay_scale) as SimTime;
            scaled.clamp(config.min_delay_ms, config.max_delay_ms)
        }
        None => config.default_delay_ms,
    }
}
