//! Simulation configuration and validation.
//!
//! All timing and sizing knobs live here; nothing is hardwired into the
//! philosopher state machine itself.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of philosophers (and forks) in the ring. Must be at least 2.
    pub philosophers: usize,
    /// How long a philosopher thinks before going hungry.
    pub think_duration: Duration,
    /// How long a philosopher eats once it holds both forks.
    pub eat_duration: Duration,
    /// Fractional per-cycle jitter applied to both durations, in `[0, 1)`.
    /// Zero keeps every cycle at the configured fixed durations; nonzero
    /// values break the lockstep that identical durations tend to produce.
    pub duration_jitter: f64,
    /// Capacity of the observer event channel. Slow observers that fall more
    /// than this many events behind skip ahead rather than stall the ring.
    pub event_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            philosophers: 5,
            think_duration: Duration::from_secs(2),
            eat_duration: Duration::from_secs(3),
            duration_jitter: 0.0,
            event_capacity: 256,
        }
    }
}

impl SimulationConfig {
    /// Checks the configuration before any resource is built; a simulation is
    /// never started from an invalid config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.philosophers < 2 {
            return Err(ConfigError::TooFewPhilosophers {
                requested: self.philosophers,
            });
        }
        if self.think_duration.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "think_duration",
            });
        }
        if self.eat_duration.is_zero() {
            return Err(ConfigError::ZeroDuration {
                field: "eat_duration",
            });
        }
        if !(0.0..1.0).contains(&self.duration_jitter) {
            return Err(ConfigError::InvalidJitter {
                value: self.duration_jitter,
            });
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::ZeroEventCapacity);
        }
        Ok(())
    }
}

/// Errors detected while validating a [`SimulationConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("ring needs at least 2 philosophers, got {requested}")]
    TooFewPhilosophers { requested: usize },

    #[error("{field} must be nonzero")]
    ZeroDuration { field: &'static str },

    #[error("duration_jitter must be in [0, 1), got {value}")]
    InvalidJitter { value: f64 },

    #[error("event_capacity must be nonzero")]
    ZeroEventCapacity,
}
