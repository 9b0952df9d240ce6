//! Flip-flop signal trace example.
//!
//! Loads a small routed netlist (one D flip-flop feeding an inverter
//! through an FPGA-style routing node), simulates a handful of clock
//! cycles and prints every propagated signal change with its arrival
//! time — the notification stream a rendering layer would animate as
//! pulses.
//!
//! Run with: `cargo run --example flipflop_trace`

use netpulse::{Netlist, SimConfig, TimingSimulator};

const CYCLES: u64 = 6;

const NETLIST: &str = r#"{
    "module": "toggler",
    "ports": {"rst": "input", "clk": "input", "din": "input", "qout": "output"},
    "wires": ["clk", "clk_routed", "din", "d_routed", "ff_q", "ff_q2", "qout_output_0_0"],
    "components": [
        {"name": "ff", "type": "DFF",
         "inputs": [
             {"wire": "clk_routed", "pinIndex": 0, "port": "clk"},
             {"wire": "d_routed", "pinIndex": 1, "port": "d"}
         ],
         "outputs": [{"wire": "ff_q", "pinIndex": 0}]},
        {"name": "route_q", "type": "fpga_interconnect", "inputs": [], "outputs": []},
        {"name": "inv", "type": "NOT",
         "inputs": [{"wire": "ff_q2", "pinIndex": 0}],
         "outputs": [{"wire": "qout_output_0_0", "pinIndex": 0}]}
    ],
    "interconnects": [
        {"name": "rt_clk", "type": "interconnect", "datain": "clk", "dataout": "clk_routed"},
        {"name": "rt_d", "type": "interconnect", "datain": "din", "dataout": "d_routed"}
    ],
    "connections": [
        {"wire": "ff_q",
         "from": {"component": "ff", "type": "DFF", "pinIndex": 0},
         "to": {"component": "route_q", "type": "interconnect", "pinIndex": 0}},
        {"wire": "ff_q2",
         "from": {"component": "route_q", "type": "interconnect", "pinIndex": 0},
         "to": {"component": "inv", "type": "NOT", "pinIndex": 0}}
    ],
    "timing": {
        "delays": [
            {"instance": "seg_ff_q", "max_delay": 7500.0}
        ]
    }
}"#;

fn main() {
    netpulse::init_logging("info");

    let netlist = Netlist::from_json(NETLIST).expect("netlist record parses");
    let mut sim = TimingSimulator::with_config(&netlist, SimConfig::default());

    println!("==== Flip-flop trace ====");
    println!(
        "{} real components, {} contracted connections, {} port bindings\n",
        sim.component_names().count(),
        sim.connections().len(),
        sim.bindings().len()
    );

    for _ in 0..CYCLES {
        match sim.step() {
            Ok(outcome) => {
                println!(
                    "cycle {} ({} events processed):",
                    outcome.cycle, outcome.events_processed
                );
                for change in &outcome.changes {
                    println!(
                        "  t={:>5}  {:>7} -> {:<7}  [{}] = {}",
                        change.arrival_time,
                        change.source,
                        change.destination,
                        change.wire,
                        change.value as u8
                    );
                }
                let levels: Vec<String> = outcome
                    .outputs
                    .iter()
                    .map(|(name, level)| format!("{name}={}", *level as u8))
                    .collect();
                println!("  outputs: {}\n", levels.join("  "));
            }
            Err(err) => println!("  cycle failed: {err}\n"),
        }
    }

    println!("==== Statistics ====");
    println!(
        "{}",
        serde_json::to_string_pretty(&sim.export_stats()).expect("stats serialize")
    );
}
