// Dining Philosophers Simulation Library
//
// The concurrency engine for the classic dining-philosophers problem:
// N philosophers in a ring, two shared forks each, ascending fork-id
// acquisition to rule out deadlock, and an asynchronous observer channel
// for state changes.

pub mod config;
pub mod error;
pub mod fork;
pub mod philosopher;
pub mod registry;
pub mod simulation;

// Re-export commonly used types
pub use config::{ConfigError, SimulationConfig};
pub use error::SimulationError;
pub use fork::{Fork, ForkError};
pub use philosopher::Philosopher;
pub use registry::{PhilosopherState, RegistryError, StateChange, StateRegistry};
pub use simulation::Simulation;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
