//! Netlist graph contraction.
//!
//! Raw connections run pin-to-pin through routing placeholders and ground
//! ties. The [`GraphSimplifier`] contracts each raw connection into an
//! edge whose endpoints are real functional components: the source
//! endpoint is traced upstream to the real component driving it, the
//! destination endpoint downstream to the real component receiving it,
//! so contracted edges preserve signal direction. Ground/constant
//! components are dropped while building the adjacency maps, so they can
//! never appear in a trace result.
//!
//! A trace that exhausts the graph without reaching a real node returns
//! the original endpoint unchanged. This is a degraded result, not a
//! failure; callers that end up with an empty simplified list can fall
//! back to [`direct_connections`].

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::netlist::{is_ground, Netlist, RawConnection};
use crate::types::PinIndex;

/// One endpoint of a simplified connection.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionEnd {
    pub component: String,
    pub pin_index: PinIndex,
}

/// A directed component-to-component edge over one wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub wire: String,
    pub from: ConnectionEnd,
    pub to: ConnectionEnd,
}

/// Contracts raw per-pin connections into real-endpoint edges.
pub struct GraphSimplifier<'a> {
    /// Ground-filtered raw connections in record order
    connections: Vec<&'a RawConnection>,
    /// Outgoing raw connections keyed by source component
    out_map: HashMap<&'a str, Vec<&'a RawConnection>>,
    /// Incoming raw connections keyed by destination component
    in_map: HashMap<&'a str, Vec<&'a RawConnection>>,
    /// Names of components that are valid trace results
    real_nodes: HashSet<String>,
}

impl<'a> GraphSimplifier<'a> {
    /// Builds a simplifier over the netlist's raw connections.
    ///
    /// The real-node set defaults to the netlist's real components (not
    /// ground-named, not interconnect-typed).
    pub fn new(netlist: &'a Netlist) -> Self {
        let real_nodes = netlist
            .real_components()
            .iter()
            .map(|c| c.name.clone())
            .collect();
        Self::with_real_nodes(netlist, real_nodes)
    }

    /// Builds a simplifier with a caller-supplied real-node classification.
    ///
    /// Ground-named components are stripped from the supplied set; they
    /// are never valid trace results.
    pub fn with_real_nodes(netlist: &'a Netlist, real_nodes: HashSet<String>) -> Self {
        let mut connections = Vec::new();
        let mut out_map: HashMap<&str, Vec<&RawConnection>> = HashMap::new();
        let mut in_map: HashMap<&str, Vec<&RawConnection>> = HashMap::new();

        for conn in &netlist.connections {
            if is_ground(&conn.from.component) || is_ground(&conn.to.component) {
                continue;
            }
            connections.push(conn);
            out_map.entry(&conn.from.component).or_default().push(conn);
            in_map.entry(&conn.to.component).or_default().push(conn);
        }

        let real_nodes = real_nodes.into_iter().filter(|n| !is_ground(n)).collect();

        Self {
            connections,
            out_map,
            in_map,
            real_nodes,
        }
    }

    /// Contracts every raw connection into a real-endpoint edge.
    ///
    /// Returns an empty list when the netlist carries no raw connections;
    /// the caller is responsible for choosing an alternate construction
    /// strategy in that case.
    pub fn simplify(&self) -> Vec<Connection> {
        let mut simplified = Vec::new();

        for conn in &self.connections {
            let from = self.trace_to_real_source(&conn.from.component, conn.from.pin_index);
            let to = self.trace_to_real_destination(&conn.to.component, conn.to.pin_index);

            simplified.push(Connection {
                wire: conn.wire.clone(),
                from,
                to,
            });
        }

        simplified
    }

    /// Walks upstream from `start` until a real driving component is hit.
    ///
    /// Breadth-first with a visited set, so pass-through cycles terminate.
    /// Falls back to the starting endpoint when no real node is reachable.
    fn trace_to_real_source(&self, start: &str, start_pin: PinIndex) -> ConnectionEnd {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<(&str, PinIndex)> = VecDeque::new();
        queue.push_back((start, start_pin));

        while let Some((component, pin_index)) = queue.pop_front() {
            if self.real_nodes.contains(component) {
                return ConnectionEnd {
                    component: component.to_string(),
                    pin_index,
                };
            }
            if !visited.insert(component) {
                continue;
            }
            for conn in self.in_map.get(component).into_iter().flatten() {
                queue.push_back((&conn.from.component, conn.from.pin_index));
            }
        }

        debug!(component = start, "no real source reachable, keeping endpoint");
        ConnectionEnd {
            component: start.to_string(),
            pin_index: start_pin,
        }
    }

    /// Walks downstream from `start` until a real receiving component is
    /// hit.
    fn trace_to_real_destination(&self, start: &str, start_pin: PinIndex) -> ConnectionEnd {
        let mut visited: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<(&str, PinIndex)> = VecDeque::new();
        queue.push_back((start, start_pin));

        while let Some((component, pin_index)) = queue.pop_front() {
            if self.real_nodes.contains(component) {
                return ConnectionEnd {
                    component: component.to_string(),
                    pin_index,
                };
            }
            if !visited.insert(component) {
                continue;
            }
            for conn in self.out_map.get(component).into_iter().flatten() {
                queue.push_back((&conn.to.component, conn.to.pin_index));
            }
        }

        debug!(component = start, "no real destination reachable, keeping endpoint");
        ConnectionEnd {
            component: start.to_string(),
            pin_index: start_pin,
        }
    }
}

/// Ground-filtered raw connections, untraced.
///
/// The fallback construction strategy for netlists where contraction
/// yields nothing (for example, records with no routing placeholders at
/// all, where every raw edge already joins real components).
pub fn direct_connections(netlist: &Netlist) -> Vec<Connection> {
    netlist
        .connections
        .iter()
        .filter(|c| !is_ground(&c.from.component) && !is_ground(&c.to.component))
        .map(|c| Connection {
            wire: c.wire.clone(),
            from: ConnectionEnd {
                component: c.from.component.clone(),
                pin_index: c.from.pin_index,
            },
            to: ConnectionEnd {
                component: c.to.component.clone(),
                pin_index: c.to.pin_index,
            },
        })
        .collect()
}
