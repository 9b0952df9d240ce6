//! # Netpulse
//!
//! The logic core of an interactive circuit visualization tool: netlist
//! graph contraction, module-port binding, pure component logic
//! evaluation and a timing-aware discrete-event simulation that advances
//! component state cycle by cycle.
//!
//! ## Design Principles
//!
//! - **Passive input**: the netlist is a record produced by an external
//!   parser and consumed verbatim; the core performs no file or network
//!   I/O and depends on no rendering primitive.
//! - **Real endpoints**: contracted connections always join functional
//!   components; routing placeholders and ground ties never appear as
//!   endpoints.
//! - **Pure evaluation**: component logic is a referentially transparent
//!   function of classification, input levels, previous outputs and the
//!   previous clock level.
//! - **Change-only propagation**: signals fan out only when an output
//!   actually changed, bounded per drain by an already-notified set and
//!   an oscillation budget.
//! - **Single-flight cycles**: one cycle's drain is atomic; a new cycle
//!   cannot start before the previous drain completes.
//!
//! ## Quick Start
//!
//! ```rust
//! use netpulse::{Netlist, TimingSimulator};
//!
//! let netlist = Netlist::from_json(r#"{
//!     "module": "toy",
//!     "ports": {"CLK": "input", "D": "input", "Q": "output"},
//!     "wires": ["CLK", "D", "q_net"],
//!     "components": [{
//!         "name": "ff0", "type": "DFF",
//!         "inputs": [
//!             {"wire": "CLK", "pinIndex": 0, "port": "clk"},
//!             {"wire": "D", "pinIndex": 1, "port": "d"}
//!         ],
//!         "outputs": [{"wire": "q_net", "pinIndex": 0}]
//!     }]
//! }"#).unwrap();
//!
//! let mut sim = TimingSimulator::new(&netlist);
//! let outcome = sim.step().unwrap();
//! println!("cycle 0 produced {} notifications", outcome.changes.len());
//! ```
//!
//! ## Statistics
//!
//! ```rust,ignore
//! let stats = sim.export_stats();
//! println!("events processed: {}", stats["events_processed"]);
//! ```

pub mod types;
pub mod error;
pub mod netlist;
pub mod simplify;
pub mod bind;
pub mod logic;
pub mod stimulus;
pub mod propagation;
pub mod state;
pub mod sim;
pub mod config;

// Re-export commonly used types
pub use types::{Cycle, PinIndex, SimTime};
pub use error::{SimError, SimResult};
pub use netlist::{Component, Interconnect, Netlist, PortDirection, RawConnection};
pub use simplify::{direct_connections, Connection, ConnectionEnd, GraphSimplifier};
pub use bind::{PortBinder, PortBinding};
pub use logic::{classify, evaluate, ComponentClass};
pub use stimulus::{classify_port, PortPattern, StimulusGenerator};
pub use propagation::{classify_signal, PropagationEdge, PropagationTable, SignalClass};
pub use state::{ComponentState, StateStore};
pub use sim::{CycleOutcome, EventQueue, SignalChange, SignalEvent, SimPhase, TimingSimulator};
pub use config::{ConfigError, SimConfig};

/// Initialize the tracing subscriber for logging.
///
/// Call this at the start of your program to enable logging.
///
/// # Example
///
/// ```rust,ignore
/// netpulse::init_logging("info");
/// ```
pub fn init_logging(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
