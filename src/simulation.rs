//! The orchestrator: builds the ring and drives the philosopher tasks.
//!
//! `Simulation` owns the forks, the state registry, the cancellation token,
//! and one tokio task per philosopher. Fork `i` is shared between philosopher
//! `i` (as its left) and philosopher `(i + 1) % N` (as its right).

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::fork::Fork;
use crate::philosopher::Philosopher;
use crate::registry::{PhilosopherState, StateChange, StateRegistry};

/// A dining-philosophers simulation over `N >= 2` seats.
#[derive(Debug)]
pub struct Simulation {
    config: SimulationConfig,
    forks: Vec<Arc<Fork>>,
    registry: Arc<StateRegistry>,
    cancel: CancellationToken,
    handles: Vec<(usize, JoinHandle<Result<(), SimulationError>>)>,
}

impl Simulation {
    /// Validates the configuration and builds the ring. Nothing runs until
    /// [`start`](Self::start); an invalid config never gets that far.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let forks = (0..config.philosophers)
            .map(|id| Arc::new(Fork::new(id)))
            .collect();
        let registry = Arc::new(StateRegistry::new(
            config.philosophers,
            config.event_capacity,
        ));
        Ok(Self {
            config,
            forks,
            registry,
            cancel: CancellationToken::new(),
            handles: Vec::new(),
        })
    }

    pub fn philosophers(&self) -> usize {
        self.config.philosophers
    }

    /// Subscribes an observer to state changes. Works before or after
    /// [`start`](Self::start); events are delivered asynchronously and a
    /// lagging observer skips ahead instead of stalling the simulation.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.registry.subscribe()
    }

    /// A coherent snapshot of every philosopher's current state.
    pub fn snapshot(&self) -> Vec<PhilosopherState> {
        self.registry.snapshot()
    }

    /// Spawns one task per philosopher. Calling it again is a no-op.
    pub fn start(&mut self) {
        if !self.handles.is_empty() {
            return;
        }
        let n = self.config.philosophers;
        for id in 0..n {
            let philosopher = Philosopher::new(
                id,
                Arc::clone(&self.forks[id]),
                Arc::clone(&self.forks[(id + 1) % n]),
                Arc::clone(&self.registry),
                &self.config,
            );
            let cancel = self.cancel.clone();
            self.handles.push((id, tokio::spawn(philosopher.run(cancel))));
        }
        info!(philosophers = n, "simulation started");
    }

    /// Signals every philosopher to stop and waits for all of them. Each task
    /// exits within one think/eat cycle. Returns the first philosopher fault
    /// if any task ended badly, and checks that no fork was left held.
    pub async fn shutdown(mut self) -> Result<(), SimulationError> {
        self.cancel.cancel();
        let mut fault: Option<SimulationError> = None;
        for (id, handle) in self.handles.drain(..) {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(source)) => {
                    error!(philosopher = id, %source, "philosopher faulted");
                    fault.get_or_insert(SimulationError::Faulted {
                        id,
                        source: Box::new(source),
                    });
                }
                Err(join_error) => {
                    error!(philosopher = id, %join_error, "philosopher task did not complete");
                    fault.get_or_insert(SimulationError::TaskFailed { id });
                }
            }
        }
        for fork in &self.forks {
            if let Some(held_by) = fork.holder() {
                error!(fork = fork.id(), held_by, "fork still held after shutdown");
                fault.get_or_insert(SimulationError::ForkLeaked {
                    fork: fork.id(),
                    held_by,
                });
            }
        }
        info!("simulation stopped");
        match fault {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_fails_before_anything_runs() {
        let config = SimulationConfig {
            philosophers: 1,
            ..Default::default()
        };
        assert!(matches!(
            Simulation::new(config),
            Err(SimulationError::Config(_))
        ));
    }

    #[tokio::test]
    async fn new_simulation_starts_all_thinking() {
        let sim = Simulation::new(SimulationConfig::default()).unwrap();
        assert_eq!(sim.philosophers(), 5);
        assert_eq!(sim.snapshot(), vec![PhilosopherState::Thinking; 5]);
    }

    #[tokio::test]
    async fn shutdown_without_start_is_clean() {
        let sim = Simulation::new(SimulationConfig::default()).unwrap();
        sim.shutdown().await.unwrap();
    }
}
