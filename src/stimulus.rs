//! Per-cycle stimulus generation for module input ports.
//!
//! Stimulus is a pure function of the cycle index and the static port
//! classification, so a replayed session produces identical waveforms.
//! Ports are classified from their names: reset ports assert only on
//! cycle 0, clock ports toggle by cycle parity, data ports round-robin
//! three periodic waveforms, and everything else follows a one-low-per-3
//! pattern.
//!
//! The waveform periods are illustrative defaults chosen to exercise
//! varied signal activity; they encode no functional requirement.

use serde::{Deserialize, Serialize};

use crate::netlist::Netlist;
use crate::types::Cycle;

/// Stimulus pattern assigned to an input port.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortPattern {
    /// High on cycle 0 only
    Reset,
    /// High on even cycles, low on odd cycles
    Clock,
    /// One of three periodic data waveforms, assigned round-robin
    Data,
    /// Low every third cycle, high otherwise
    Other,
}

/// Classifies a port name into its stimulus pattern.
///
/// Checked in order: reset patterns win over clock patterns, which win
/// over data patterns (`rst` would otherwise never match, and `d` is a
/// deliberately loose data heuristic).
pub fn classify_port(name: &str) -> PortPattern {
    let name = name.to_lowercase();
    if name.contains("rst") || name.contains("reset") {
        PortPattern::Reset
    } else if name.contains("clk") || name.contains("clock") {
        PortPattern::Clock
    } else if name.contains('d') || name.contains("data") {
        PortPattern::Data
    } else {
        PortPattern::Other
    }
}

/// One input port with its pattern and per-pattern ordinal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrivenPort {
    pub name: String,
    pub pattern: PortPattern,
    /// Position among the ports sharing this pattern, in declaration order
    pub ordinal: u64,
}

/// Generates reproducible stimulus levels for every input port.
#[derive(Clone, Debug, Default)]
pub struct StimulusGenerator {
    ports: Vec<DrivenPort>,
}

impl StimulusGenerator {
    /// Classifies the netlist's input ports in declaration order.
    pub fn new(netlist: &Netlist) -> Self {
        let mut counts = [0u64; 4];
        let ports = netlist
            .input_ports()
            .map(|name| {
                let pattern = classify_port(name);
                let slot = pattern as usize;
                let ordinal = counts[slot];
                counts[slot] += 1;
                DrivenPort {
                    name: name.clone(),
                    pattern,
                    ordinal,
                }
            })
            .collect();
        Self { ports }
    }

    /// The classified input ports, in declaration order.
    pub fn ports(&self) -> &[DrivenPort] {
        &self.ports
    }

    /// Stimulus levels for one cycle, in port declaration order.
    pub fn levels_for_cycle(&self, cycle: Cycle) -> Vec<(String, bool)> {
        self.ports
            .iter()
            .map(|p| (p.name.clone(), level(p.pattern, p.ordinal, cycle)))
            .collect()
    }
}

/// The level of one port pattern at one cycle.
pub fn level(pattern: PortPattern, ordinal: u64, cycle: Cycle) -> bool {
    match pattern {
        PortPattern::Reset => cycle == 0,
        PortPattern::Clock => cycle % 2 == 0,
        PortPattern::Data => {
            // Offset staggers ports sharing a waveform.
            let shifted = cycle + ordinal * 2;
            match ordinal % 3 {
                0 => (shifted / 2) % 2 == 0,
                1 => (shifted / 3) % 2 == 0,
                _ => shifted % 4 == 0,
            }
        }
        PortPattern::Other => (cycle + ordinal) % 3 != 0,
    }
}
