//! Component logic evaluation.
//!
//! Evaluation is a pure function: identical (classification, input
//! levels, previous outputs, previous clock level) always produce
//! identical outputs. Classification is an explicit ordered table of
//! (predicate, class) pairs over the lowercased type tag and instance
//! name; the first match wins, which keeps the documented dispatch order
//! auditable and testable in isolation.
//!
//! The netlist format carries no pin-role metadata, so clock and data
//! pins of edge-triggered storage are resolved from pin labels when the
//! parser preserved them, falling back to index conventions otherwise.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::PinIndex;

/// Behavioral classification of a component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentClass {
    /// Flip-flop style storage: output follows data only on a rising clock edge
    EdgeTriggered,
    And,
    Or,
    Not,
    Xor,
    Nand,
    Nor,
    /// Passthrough of the first input
    Buffer,
    /// 2-to-1 multiplexer, selector on the lowest-indexed input
    Mux,
    /// Reset-dominant set/reset latch
    SrLatch,
    /// No recognized pattern; passthrough or OR heuristic applies
    Unknown,
}

type Predicate = fn(ty: &str, name: &str) -> bool;

fn has(ty: &str, name: &str, pat: &str) -> bool {
    ty.contains(pat) || name.contains(pat)
}

/// Ordered first-match-wins classification table.
///
/// AND excludes NAND matches and OR excludes XOR/NOR matches so that the
/// negated gates, listed later, stay reachable. Edge-triggered storage
/// matches flip-flop patterns only; `latch` names classify as SR latches.
static CLASSIFIERS: &[(Predicate, ComponentClass)] = &[
    (
        |t, n| t.contains("dff") || n.contains("dff") || n.contains("flip") || n.contains("flop"),
        ComponentClass::EdgeTriggered,
    ),
    (
        |t, n| has(t, n, "and") && !has(t, n, "nand"),
        ComponentClass::And,
    ),
    (
        |t, n| has(t, n, "or") && !has(t, n, "xor") && !has(t, n, "nor"),
        ComponentClass::Or,
    ),
    (
        |t, n| has(t, n, "not") || n.contains("inv"),
        ComponentClass::Not,
    ),
    (|t, n| has(t, n, "xor"), ComponentClass::Xor),
    (|t, n| has(t, n, "nand"), ComponentClass::Nand),
    (|t, n| has(t, n, "nor"), ComponentClass::Nor),
    (|t, _| t.contains("buf"), ComponentClass::Buffer),
    (|t, n| has(t, n, "mux"), ComponentClass::Mux),
    (|t, n| has(t, n, "latch"), ComponentClass::SrLatch),
];

/// Classifies a component from its type tag and instance name.
pub fn classify(ty: &str, name: &str) -> ComponentClass {
    let ty = ty.to_lowercase();
    let name = name.to_lowercase();
    for (predicate, class) in CLASSIFIERS {
        if predicate(&ty, &name) {
            return *class;
        }
    }
    ComponentClass::Unknown
}

/// Computes new output levels from the current input snapshot.
///
/// `labels` maps input pin indices to their label text (the pin's `port`
/// label or wire name); it feeds the clock/data resolution heuristics
/// only. `prev_outputs` seed the result, so pins not driven by this
/// evaluation hold their level. With zero driven inputs, output pin 0 is
/// driven false for every class.
pub fn evaluate(
    class: ComponentClass,
    inputs: &BTreeMap<PinIndex, bool>,
    labels: &BTreeMap<PinIndex, String>,
    prev_outputs: &BTreeMap<PinIndex, bool>,
    prev_clock: bool,
) -> BTreeMap<PinIndex, bool> {
    let mut outputs = prev_outputs.clone();

    if inputs.is_empty() {
        outputs.insert(0, false);
        return outputs;
    }

    // Inputs in ascending pin-index order, for the position-keyed classes.
    let levels: Vec<bool> = inputs.values().copied().collect();

    match class {
        ComponentClass::EdgeTriggered => {
            let clock_pin = resolve_clock_pin(inputs, labels);
            if let Some(&clock) = inputs.get(&clock_pin) {
                if clock && !prev_clock {
                    if let Some(data_pin) = resolve_data_pin(inputs, labels, clock_pin) {
                        outputs.insert(0, inputs[&data_pin]);
                    }
                }
            }
        }
        ComponentClass::And => {
            outputs.insert(0, levels.iter().all(|&v| v));
        }
        ComponentClass::Or => {
            outputs.insert(0, levels.iter().any(|&v| v));
        }
        ComponentClass::Not => {
            outputs.insert(0, !levels[0]);
        }
        ComponentClass::Xor => {
            outputs.insert(0, levels.iter().filter(|&&v| v).count() % 2 == 1);
        }
        ComponentClass::Nand => {
            outputs.insert(0, !levels.iter().all(|&v| v));
        }
        ComponentClass::Nor => {
            outputs.insert(0, !levels.iter().any(|&v| v));
        }
        ComponentClass::Buffer => {
            outputs.insert(0, levels[0]);
        }
        ComponentClass::Mux => {
            let selector = levels[0];
            let picked = if selector { levels.get(2) } else { levels.get(1) };
            outputs.insert(0, picked.copied().unwrap_or(false));
        }
        ComponentClass::SrLatch => {
            if levels.len() >= 2 {
                let (set, reset) = (levels[0], levels[1]);
                if reset {
                    outputs.insert(0, false);
                } else if set {
                    outputs.insert(0, true);
                }
                // Both low: hold previous output.
            }
        }
        ComponentClass::Unknown => {
            if levels.len() == 1 {
                outputs.insert(0, levels[0]);
            } else {
                outputs.insert(0, levels.iter().any(|&v| v));
            }
        }
    }

    outputs
}

fn label_matches_clock(label: &str) -> bool {
    let label = label.to_lowercase();
    label.contains("clk") || label.contains("clock")
}

fn label_matches_data(label: &str) -> bool {
    let label = label.to_lowercase();
    label.contains("data") || label == "d"
}

/// Resolves the clock pin of an edge-triggered component.
///
/// Label pattern match first; otherwise pin index 1 when at least two
/// inputs are driven, else index 0.
fn resolve_clock_pin(
    inputs: &BTreeMap<PinIndex, bool>,
    labels: &BTreeMap<PinIndex, String>,
) -> PinIndex {
    for (&pin, label) in labels {
        if label_matches_clock(label) {
            return pin;
        }
    }
    if inputs.len() >= 2 {
        1
    } else {
        0
    }
}

/// Resolves the data pin: first non-clock driven input, preferring a
/// label match.
fn resolve_data_pin(
    inputs: &BTreeMap<PinIndex, bool>,
    labels: &BTreeMap<PinIndex, String>,
    clock_pin: PinIndex,
) -> Option<PinIndex> {
    for &pin in inputs.keys() {
        if pin == clock_pin {
            continue;
        }
        if labels.get(&pin).is_some_and(|l| label_matches_data(l)) {
            return Some(pin);
        }
    }
    inputs.keys().copied().find(|&pin| pin != clock_pin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_simple(class: ComponentClass, levels: &[bool]) -> bool {
        let inputs: BTreeMap<PinIndex, bool> =
            levels.iter().enumerate().map(|(i, &v)| (i as PinIndex, v)).collect();
        let outputs = evaluate(class, &inputs, &BTreeMap::new(), &BTreeMap::new(), false);
        outputs[&0]
    }

    #[test]
    fn test_classification_order() {
        assert_eq!(classify("DFF", "latch_$dff~1"), ComponentClass::EdgeTriggered);
        assert_eq!(classify("cell", "my_flipflop"), ComponentClass::EdgeTriggered);
        assert_eq!(classify("AND2", "g1"), ComponentClass::And);
        assert_eq!(classify("NAND2", "g2"), ComponentClass::Nand);
        assert_eq!(classify("OR2", "g3"), ComponentClass::Or);
        assert_eq!(classify("XOR2", "g4"), ComponentClass::Xor);
        assert_eq!(classify("NOR2", "g5"), ComponentClass::Nor);
        assert_eq!(classify("NOT", "g6"), ComponentClass::Not);
        assert_eq!(classify("cell", "inv_3"), ComponentClass::Not);
        assert_eq!(classify("BUFG", "g7"), ComponentClass::Buffer);
        assert_eq!(classify("MUX21", "g8"), ComponentClass::Mux);
        assert_eq!(classify("cell", "out_latch"), ComponentClass::SrLatch);
        assert_eq!(classify("LUT", "mystery"), ComponentClass::Unknown);
    }

    #[test]
    fn test_truth_tables() {
        assert!(eval_simple(ComponentClass::And, &[true, true, true]));
        assert!(!eval_simple(ComponentClass::And, &[true, false]));
        assert!(!eval_simple(ComponentClass::Or, &[false, false]));
        assert!(eval_simple(ComponentClass::Or, &[false, true]));
        assert!(eval_simple(ComponentClass::Xor, &[true, true, true]));
        assert!(!eval_simple(ComponentClass::Xor, &[true, true]));
        assert!(!eval_simple(ComponentClass::Nand, &[true, true]));
        assert!(eval_simple(ComponentClass::Nor, &[false, false]));
        assert!(!eval_simple(ComponentClass::Not, &[true]));
        assert!(eval_simple(ComponentClass::Buffer, &[true, false]));
    }

    #[test]
    fn test_zero_inputs_drive_false() {
        for class in [
            ComponentClass::And,
            ComponentClass::Or,
            ComponentClass::EdgeTriggered,
            ComponentClass::Unknown,
        ] {
            assert!(!eval_simple(class, &[]));
        }
    }

    #[test]
    fn test_mux_keys_by_ascending_pin_index() {
        // Pins deliberately inserted out of order; BTreeMap re-sorts them.
        let inputs: BTreeMap<PinIndex, bool> =
            [(4, true), (0, false), (2, false)].into_iter().collect();
        let outputs = evaluate(
            ComponentClass::Mux,
            &inputs,
            &BTreeMap::new(),
            &BTreeMap::new(),
            false,
        );
        // Selector (pin 0) low picks the second-lowest input (pin 2).
        assert!(!outputs[&0]);

        let inputs: BTreeMap<PinIndex, bool> =
            [(4, true), (0, true), (2, false)].into_iter().collect();
        let outputs = evaluate(
            ComponentClass::Mux,
            &inputs,
            &BTreeMap::new(),
            &BTreeMap::new(),
            false,
        );
        // Selector high picks the third-lowest input (pin 4).
        assert!(outputs[&0]);
    }

    #[test]
    fn test_sr_latch_reset_dominates() {
        assert!(!eval_simple(ComponentClass::SrLatch, &[true, true]));
        assert!(eval_simple(ComponentClass::SrLatch, &[true, false]));

        // Both low holds the previous output.
        let inputs: BTreeMap<PinIndex, bool> = [(0, false), (1, false)].into_iter().collect();
        let prev: BTreeMap<PinIndex, bool> = [(0, true)].into_iter().collect();
        let outputs = evaluate(
            ComponentClass::SrLatch,
            &inputs,
            &BTreeMap::new(),
            &prev,
            false,
        );
        assert!(outputs[&0]);
    }

    #[test]
    fn test_edge_trigger_transition_table() {
        let labels: BTreeMap<PinIndex, String> =
            [(0, "clk".to_string()), (1, "d".to_string())].into_iter().collect();
        let prev: BTreeMap<PinIndex, bool> = [(0, false)].into_iter().collect();

        // Rising edge captures data.
        let inputs: BTreeMap<PinIndex, bool> = [(0, true), (1, true)].into_iter().collect();
        let outputs = evaluate(ComponentClass::EdgeTriggered, &inputs, &labels, &prev, false);
        assert!(outputs[&0]);

        // High, no edge: unchanged.
        let outputs = evaluate(ComponentClass::EdgeTriggered, &inputs, &labels, &prev, true);
        assert!(!outputs[&0]);

        // Falling edge: unchanged.
        let inputs: BTreeMap<PinIndex, bool> = [(0, false), (1, true)].into_iter().collect();
        let outputs = evaluate(ComponentClass::EdgeTriggered, &inputs, &labels, &prev, true);
        assert!(!outputs[&0]);

        // Low, no edge: unchanged.
        let outputs = evaluate(ComponentClass::EdgeTriggered, &inputs, &labels, &prev, false);
        assert!(!outputs[&0]);
    }

    #[test]
    fn test_clock_pin_index_fallback() {
        // No labels, two inputs: clock resolves to pin 1, data to pin 0.
        let inputs: BTreeMap<PinIndex, bool> = [(0, true), (1, true)].into_iter().collect();
        let outputs = evaluate(
            ComponentClass::EdgeTriggered,
            &inputs,
            &BTreeMap::new(),
            &BTreeMap::new(),
            false,
        );
        assert!(outputs[&0]);
    }

    #[test]
    fn test_unknown_component_heuristics() {
        assert!(eval_simple(ComponentClass::Unknown, &[true]));
        assert!(!eval_simple(ComponentClass::Unknown, &[false]));
        assert!(eval_simple(ComponentClass::Unknown, &[false, true, false]));
    }

    #[test]
    fn test_evaluator_is_deterministic() {
        let inputs: BTreeMap<PinIndex, bool> = [(0, true), (1, false)].into_iter().collect();
        let labels: BTreeMap<PinIndex, String> = [(0, "clk".to_string())].into_iter().collect();
        let prev: BTreeMap<PinIndex, bool> = [(0, true)].into_iter().collect();

        let a = evaluate(ComponentClass::EdgeTriggered, &inputs, &labels, &prev, false);
        let b = evaluate(ComponentClass::EdgeTriggered, &inputs, &labels, &prev, false);
        assert_eq!(a, b);
    }
}
