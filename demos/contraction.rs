//! Graph contraction and port binding example.
//!
//! Shows the two analysis passes a drawing layer consumes before any
//! simulation runs: raw per-pin connections contracted into edges between
//! real components, and module ports resolved to the component pins they
//! drive through wire aliases.
//!
//! Run with: `cargo run --example contraction`

use netpulse::{direct_connections, GraphSimplifier, Netlist, PortBinder};

const NETLIST: &str = r#"{
    "module": "routed_and",
    "ports": {"a": "input", "b": "input", "y": "output"},
    "wires": ["a", "a_routed", "b", "g_out", "g_out2", "y_output_0_0"],
    "components": [
        {"name": "gate", "type": "AND2",
         "inputs": [
             {"wire": "a_routed", "pinIndex": 0},
             {"wire": "b", "pinIndex": 1}
         ],
         "outputs": [{"wire": "g_out", "pinIndex": 0}]},
        {"name": "route_0", "type": "fpga_interconnect", "inputs": [], "outputs": []},
        {"name": "drv", "type": "BUF",
         "inputs": [{"wire": "g_out2", "pinIndex": 0}],
         "outputs": [{"wire": "y_output_0_0", "pinIndex": 0}]},
        {"name": "lut_gnd~0", "type": "LUT", "inputs": [], "outputs": []}
    ],
    "interconnects": [
        {"name": "rt_a", "type": "interconnect", "datain": "a", "dataout": "a_routed"}
    ],
    "connections": [
        {"wire": "g_out",
         "from": {"component": "gate", "type": "AND2", "pinIndex": 0},
         "to": {"component": "route_0", "type": "interconnect", "pinIndex": 0}},
        {"wire": "g_out2",
         "from": {"component": "route_0", "type": "interconnect", "pinIndex": 0},
         "to": {"component": "drv", "type": "BUF", "pinIndex": 0}},
        {"wire": "gnd_tie",
         "from": {"component": "lut_gnd~0", "type": "LUT", "pinIndex": 0},
         "to": {"component": "gate", "type": "AND2", "pinIndex": 1}}
    ]
}"#;

fn main() {
    let netlist = Netlist::from_json(NETLIST).expect("netlist record parses");

    println!("==== Real components ====");
    for comp in netlist.real_components() {
        println!(
            "  {:<8} type {:<18} {} in / {} out",
            comp.name,
            comp.ty,
            comp.inputs.len(),
            comp.outputs.len()
        );
    }

    println!("\n==== Raw connections ====");
    for conn in direct_connections(&netlist) {
        println!(
            "  {:>8} -> {:<8}  [{}]",
            conn.from.component, conn.to.component, conn.wire
        );
    }

    println!("\n==== Contracted connections ====");
    for conn in GraphSimplifier::new(&netlist).simplify() {
        println!(
            "  {:>8}.{} -> {:<8}.{}  [{}]",
            conn.from.component, conn.from.pin_index, conn.to.component, conn.to.pin_index, conn.wire
        );
    }

    println!("\n==== Port bindings ====");
    for binding in PortBinder::new(&netlist).bind_all() {
        println!(
            "  {:>4} ({:?}) -> {}.{}  via [{}]",
            binding.port, binding.direction, binding.component, binding.pin_index, binding.wire
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_contraction_skips_routing_and_ground() {
        let netlist = Netlist::from_json(NETLIST).unwrap();
        let simplified = GraphSimplifier::new(&netlist).simplify();

        // The ground tie is dropped; both routed segments contract to
        // gate -> drv.
        assert_eq!(simplified.len(), 2);
        for conn in &simplified {
            assert_eq!(conn.from.component, "gate");
            assert_eq!(conn.to.component, "drv");
        }
    }

    #[test]
    fn demo_ports_bind_through_alias() {
        let netlist = Netlist::from_json(NETLIST).unwrap();
        let bindings = PortBinder::new(&netlist).bind_all();

        let a = bindings.iter().find(|b| b.port == "a").unwrap();
        assert_eq!(a.component, "gate");
        assert_eq!(a.wire, "a_routed");
    }
}
