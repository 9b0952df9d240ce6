//! Error taxonomy for the simulation core.
//!
//! Graph tracing and port binding degrade locally to documented defaults
//! and never surface here; only cycle-level failures are escalated to the
//! caller.

use thiserror::Error;

use crate::types::Cycle;

/// Errors reported by the timing simulator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// The event-queue drain of one cycle exceeded its iteration budget.
    ///
    /// A non-settling combinational cycle keeps producing output changes
    /// instead of converging. The cycle is abandoned; component state is
    /// left as of the last processed event and later cycles may still run.
    #[error(
        "oscillation budget exceeded in cycle {cycle}: \
         {events_processed} events processed (budget {budget})"
    )]
    OscillationBudgetExceeded {
        /// Cycle index of the failed drain
        cycle: Cycle,
        /// Events processed before the drain was abandoned
        events_processed: u64,
        /// The configured per-drain budget
        budget: u64,
    },
}

/// Result type for simulator operations.
pub type SimResult<T> = Result<T, SimError>;
