//! Netlist record definitions.
//!
//! The netlist is a passive record produced entirely by an external parser
//! and consumed verbatim: module name, ports, wires, components with typed
//! pins, interconnect alias pairs, raw per-pin connections and an optional
//! per-wire delay table. The core performs no file or network I/O; records
//! arrive as already-parsed values or are deserialized from JSON by the
//! caller.
//!
//! Missing arrays and maps default to empty, so a partially populated
//! record degrades instead of failing to load.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::PinIndex;

/// Direction of a module-level port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    /// Returns true for input ports.
    pub fn is_input(&self) -> bool {
        matches!(self, PortDirection::Input)
    }
}

/// An input pin of a component.
///
/// `port` carries the pin label from the source description when the
/// parser preserved one (e.g. `clk`, `D`); `constant`/`value` mark pins
/// tied to a fixed level instead of a wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputPin {
    pub wire: String,
    pub pin_index: PinIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u8>,
}

/// An output pin of a component.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPin {
    pub wire: String,
    pub pin_index: PinIndex,
}

/// A functional or routing component instance.
///
/// Created once from the netlist and immutable thereafter. `ty` is the
/// normalized classification tag assigned by the parser; `original_type`
/// preserves the primitive name from the source description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(rename = "originalType", default, skip_serializing_if = "Option::is_none")]
    pub original_type: Option<String>,
    #[serde(default)]
    pub inputs: Vec<InputPin>,
    #[serde(default)]
    pub outputs: Vec<OutputPin>,
}

/// A routing interconnect declaring its two wires electrically identical.
///
/// Interconnects are alias edges used for BFS traversal only; they are
/// never simulation nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interconnect {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub datain: String,
    pub dataout: String,
}

/// One endpoint of a raw per-pin connection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub component: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub pin_index: PinIndex,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

/// A raw directed per-pin connection as emitted by the parser.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawConnection {
    pub wire: String,
    pub from: Endpoint,
    pub to: Endpoint,
}

/// One entry of the per-wire delay table.
///
/// `instance` is matched against wire names by substring; `max_delay` is
/// the raw maximum propagation delay from the timing analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DelayEntry {
    pub instance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_delay: Option<f64>,
}

/// Optional timing section of the netlist record.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingData {
    #[serde(default)]
    pub delays: Vec<DelayEntry>,
}

/// The complete netlist record for one circuit module.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Netlist {
    #[serde(default)]
    pub module: String,
    /// Port name to direction, in declaration order. Order matters: the
    /// stimulus generator assigns waveforms round-robin by position.
    #[serde(default)]
    pub ports: IndexMap<String, PortDirection>,
    #[serde(default)]
    pub wires: Vec<String>,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(default)]
    pub interconnects: Vec<Interconnect>,
    #[serde(default)]
    pub connections: Vec<RawConnection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingData>,
}

impl Netlist {
    /// Deserializes a netlist from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Components that participate in simulation: not ground/constant
    /// generators and not routing interconnects.
    pub fn real_components(&self) -> Vec<&Component> {
        self.components
            .iter()
            .filter(|c| !is_ground(&c.name) && !is_interconnect(&c.ty))
            .collect()
    }

    /// The delay table, empty when the record carries no timing section.
    pub fn delays(&self) -> &[DelayEntry] {
        self.timing.as_ref().map(|t| t.delays.as_slice()).unwrap_or(&[])
    }

    /// Input ports in declaration order.
    pub fn input_ports(&self) -> impl Iterator<Item = &String> {
        self.ports
            .iter()
            .filter(|(_, d)| d.is_input())
            .map(|(name, _)| name)
    }
}

/// Returns true for ground/constant generator instances.
///
/// These synthetic components emit a fixed level and are excluded from
/// the real-node graph entirely.
pub fn is_ground(name: &str) -> bool {
    name.trim().replace('\\', "").to_lowercase().contains("lut_gnd")
}

/// Returns true for pure routing placeholders.
pub fn is_interconnect(ty: &str) -> bool {
    ty.to_lowercase().contains("interconnect")
}
