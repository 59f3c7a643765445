//! Shared table of philosopher states with asynchronous observer delivery.
//!
//! Each philosopher mutates only its own entry, but observers read the table
//! as a whole, so one lock covers the whole mapping. Every update is published
//! to a broadcast channel inside the same critical section; the send never
//! blocks, so a slow or absent observer cannot stall the ring.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tokio::sync::broadcast;
use tracing::debug;

/// The three phases of a philosopher's cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhilosopherState {
    /// Doing philosophy; holds no forks. Initial state.
    Thinking,
    /// Wants to eat; held only while blocked acquiring forks.
    Hungry,
    /// Holds both forks.
    Eating,
}

impl fmt::Display for PhilosopherState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhilosopherState::Thinking => write!(f, "thinking"),
            PhilosopherState::Hungry => write!(f, "hungry"),
            PhilosopherState::Eating => write!(f, "eating"),
        }
    }
}

/// A single state transition, as delivered to observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub philosopher: usize,
    pub state: PhilosopherState,
}

/// The `id -> state` table for every philosopher in the ring.
#[derive(Debug)]
pub struct StateRegistry {
    states: Mutex<Vec<PhilosopherState>>,
    events: broadcast::Sender<StateChange>,
}

impl StateRegistry {
    /// Builds a registry covering `philosophers` entries, all `Thinking`.
    pub fn new(philosophers: usize, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity);
        Self {
            states: Mutex::new(vec![PhilosopherState::Thinking; philosophers]),
            events,
        }
    }

    /// Number of philosophers the registry covers.
    pub fn len(&self) -> usize {
        self.states.lock().expect("state table lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Updates one entry and publishes the change under the same critical
    /// section, so observers never interleave a publish with a torn snapshot.
    pub fn set_state(
        &self,
        philosopher: usize,
        state: PhilosopherState,
    ) -> Result<(), RegistryError> {
        let mut states = self.states.lock().expect("state table lock poisoned");
        let count = states.len();
        let entry = states
            .get_mut(philosopher)
            .ok_or(RegistryError::UnknownPhilosopher {
                id: philosopher,
                count,
            })?;
        *entry = state;
        debug!(philosopher, %state, "state change");
        // Send fails only when nobody is subscribed, which is fine.
        let _ = self.events.send(StateChange { philosopher, state });
        Ok(())
    }

    /// A coherent copy of the whole table.
    pub fn snapshot(&self) -> Vec<PhilosopherState> {
        self.states
            .lock()
            .expect("state table lock poisoned")
            .clone()
    }

    /// Subscribes an observer. Receivers that fall behind the channel
    /// capacity skip ahead (broadcast lag) rather than block publishers.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.events.subscribe()
    }
}

/// Faults in registry usage.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown philosopher id {id} (registry covers {count})")]
    UnknownPhilosopher { id: usize, count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_fully_populated_with_thinking() {
        let registry = StateRegistry::new(5, 16);
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.snapshot(), vec![PhilosopherState::Thinking; 5]);
    }

    #[test]
    fn set_state_updates_entry_and_publishes() {
        let registry = StateRegistry::new(3, 16);
        let mut events = registry.subscribe();

        registry.set_state(1, PhilosopherState::Hungry).unwrap();

        assert_eq!(registry.snapshot()[1], PhilosopherState::Hungry);
        assert_eq!(
            events.try_recv().unwrap(),
            StateChange {
                philosopher: 1,
                state: PhilosopherState::Hungry
            }
        );
    }

    #[test]
    fn unknown_id_is_a_fault_and_publishes_nothing() {
        let registry = StateRegistry::new(2, 16);
        let mut events = registry.subscribe();

        let err = registry.set_state(2, PhilosopherState::Eating).unwrap_err();
        assert_eq!(err, RegistryError::UnknownPhilosopher { id: 2, count: 2 });
        assert!(events.try_recv().is_err());
        assert_eq!(registry.snapshot(), vec![PhilosopherState::Thinking; 2]);
    }

    #[test]
    fn publishing_without_subscribers_is_not_an_error() {
        let registry = StateRegistry::new(2, 16);
        registry.set_state(0, PhilosopherState::Hungry).unwrap();
        assert_eq!(registry.snapshot()[0], PhilosopherState::Hungry);
    }
}
