//! Persistent per-component simulation state.
//!
//! State is owned by the simulator and handed to the pure evaluator per
//! call; there are no module-level mutable singletons. Entries are
//! created lazily on first reference, persist across cycles and are
//! never destroyed during a session.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::PinIndex;

/// Mutable state of one component (or one port pseudo-node).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentState {
    /// Last observed level per input pin
    pub inputs: BTreeMap<PinIndex, bool>,
    /// Current level per output pin; persists until overwritten by
    /// evaluation
    pub outputs: BTreeMap<PinIndex, bool>,
    /// Last observed level of a clock-classified arrival
    pub last_clock: bool,
}

impl ComponentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The component's primary output level, if pin 0 has been driven.
    pub fn primary_output(&self) -> Option<bool> {
        self.outputs.get(&0).copied()
    }
}

/// Lazily-populated map of component states.
#[derive(Clone, Debug, Default)]
pub struct StateStore {
    states: HashMap<String, ComponentState>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The state of `name`, created empty on first reference.
    pub fn state_mut(&mut self, name: &str) -> &mut ComponentState {
        self.states.entry(name.to_string()).or_default()
    }

    /// The state of `name`, if it has ever been referenced.
    pub fn get(&self, name: &str) -> Option<&ComponentState> {
        self.states.get(name)
    }

    /// Number of tracked components.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true when no component has been referenced yet.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Name to primary-output-level snapshot, for components whose pin 0
    /// has been driven.
    pub fn snapshot(&self) -> BTreeMap<String, bool> {
        self.states
            .iter()
            .filter_map(|(name, st)| st.primary_output().map(|v| (name.clone(), v)))
            .collect()
    }
}
