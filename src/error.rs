//! Crate-level error type.
//!
//! Per-component faults are defined next to their components
//! ([`ConfigError`](crate::config::ConfigError),
//! [`ForkError`](crate::fork::ForkError),
//! [`RegistryError`](crate::registry::RegistryError)); this module folds them
//! into the single error surface the orchestrator reports. None of these are
//! retried: every variant below except `Config` means an invariant broke.

use thiserror::Error;

use crate::config::ConfigError;
use crate::fork::ForkError;
use crate::registry::RegistryError;

/// Anything that can go wrong in a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("fork invariant violated: {0}")]
    Fork(#[from] ForkError),

    #[error("state registry fault: {0}")]
    Registry(#[from] RegistryError),

    /// A philosopher's task ended with an invariant violation.
    #[error("philosopher {id} faulted: {source}")]
    Faulted {
        id: usize,
        #[source]
        source: Box<SimulationError>,
    },

    /// A philosopher's task panicked or was aborted from outside.
    #[error("philosopher {id} task failed to complete")]
    TaskFailed { id: usize },

    /// A fork was still held after every task had stopped.
    #[error("fork {fork} left held by philosopher {held_by} after shutdown")]
    ForkLeaked { fork: usize, held_by: usize },
}
