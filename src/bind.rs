//! Module-port to component-pin binding.
//!
//! Module ports are not components: the netlist connects them to the rest
//! of the circuit only through wire naming conventions and interconnect
//! aliases. The [`PortBinder`] resolves each port to the real component
//! pins it drives (input ports) or is driven by (output ports), in two
//! steps: pick a candidate wire by a fixed preference order, then walk the
//! alias graph collecting every attached pin whose direction matches the
//! port's.
//!
//! Zero reachable pins is a valid outcome, not an error; the port simply
//! has no binding.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::netlist::{is_ground, Netlist, PortDirection};
use crate::types::PinIndex;

/// A resolved association between a module port and one component pin.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortBinding {
    pub port: String,
    pub direction: PortDirection,
    pub component: String,
    pub pin_index: PinIndex,
    pub wire: String,
}

/// A component pin attached to some wire.
#[derive(Clone, Debug)]
struct PinAttachment<'a> {
    component: &'a str,
    is_input: bool,
    pin_index: PinIndex,
}

/// Resolves module ports to real component pins.
pub struct PortBinder<'a> {
    netlist: &'a Netlist,
    /// Every pin of every non-ground component, keyed by its wire
    wire_pins: HashMap<&'a str, Vec<PinAttachment<'a>>>,
    /// Bidirectional alias adjacency from the interconnect records
    aliases: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> PortBinder<'a> {
    pub fn new(netlist: &'a Netlist) -> Self {
        let mut wire_pins: HashMap<&str, Vec<PinAttachment>> = HashMap::new();
        for comp in &netlist.components {
            if is_ground(&comp.name) {
                continue;
            }
            for pin in &comp.inputs {
                wire_pins.entry(&pin.wire).or_default().push(PinAttachment {
                    component: &comp.name,
                    is_input: true,
                    pin_index: pin.pin_index,
                });
            }
            for pin in &comp.outputs {
                wire_pins.entry(&pin.wire).or_default().push(PinAttachment {
                    component: &comp.name,
                    is_input: false,
                    pin_index: pin.pin_index,
                });
            }
        }

        let mut aliases: HashMap<&str, Vec<&str>> = HashMap::new();
        for ic in &netlist.interconnects {
            aliases.entry(&ic.datain).or_default().push(&ic.dataout);
            aliases.entry(&ic.dataout).or_default().push(&ic.datain);
        }

        Self {
            netlist,
            wire_pins,
            aliases,
        }
    }

    /// Resolves every port of the netlist.
    ///
    /// Bindings are de-duplicated on (port, component, pin): a pin
    /// attached to several aliased wires is reported once, so downstream
    /// fan-out sees each target exactly once.
    pub fn bind_all(&self) -> Vec<PortBinding> {
        let mut bindings = Vec::new();
        for (port, &direction) in &self.netlist.ports {
            bindings.extend(self.bind_port(port, direction));
        }
        bindings
    }

    /// Resolves one port to its reachable, direction-consistent pins.
    pub fn bind_port(&self, port: &str, direction: PortDirection) -> Vec<PortBinding> {
        let candidate = self.candidate_wire(port, direction);

        let mut bindings = Vec::new();
        let mut seen: HashSet<(&str, PinIndex)> = HashSet::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(candidate);

        while let Some(wire) = queue.pop_front() {
            if !visited.insert(wire) {
                continue;
            }

            for pin in self.wire_pins.get(wire).into_iter().flatten() {
                if pin.is_input != direction.is_input() {
                    continue;
                }
                if !seen.insert((pin.component, pin.pin_index)) {
                    continue;
                }
                bindings.push(PortBinding {
                    port: port.to_string(),
                    direction,
                    component: pin.component.to_string(),
                    pin_index: pin.pin_index,
                    wire: wire.to_string(),
                });
            }

            for &next in self.aliases.get(wire).into_iter().flatten() {
                if !visited.contains(next) {
                    queue.push_back(next);
                }
            }
        }

        if bindings.is_empty() {
            debug!(port, "no reachable pins, port left unbound");
        }
        bindings
    }

    /// Picks the wire to start the alias traversal from.
    ///
    /// Preference order: exact name match (raw or backslash-stripped,
    /// with the parser's `\name` and `\name_<dir>_0_0` spellings), then a
    /// direction-suffix convention match, then any wire containing the
    /// port name, else the port name itself.
    fn candidate_wire<'p>(&'p self, port: &'p str, direction: PortDirection) -> &'p str {
        let clean = port.replace('\\', "");
        let escaped = format!("\\{clean}");
        let escaped_in = format!("\\{clean}_input_0_0");
        let escaped_out = format!("\\{clean}_output_0_0");

        let wires = &self.netlist.wires;
        if let Some(w) = wires.iter().find(|w| {
            let w = w.as_str();
            w == port || w == clean || w == escaped || w == escaped_in || w == escaped_out
        }) {
            return w;
        }

        let dir_suffix = match direction {
            PortDirection::Input => "input_0_0",
            PortDirection::Output => "output_0_0",
        };
        if let Some(w) = wires
            .iter()
            .find(|w| w.contains(&clean) && w.contains(dir_suffix))
        {
            return w;
        }

        if let Some(w) = wires.iter().find(|w| w.contains(&clean)) {
            return w;
        }

        port
    }
}
