//! The philosopher state machine.
//!
//! Each philosopher runs the cycle think -> hungry -> eat forever, acquiring
//! its two forks in ascending fork-id order. The ascending order is the
//! deadlock-avoidance rule: every philosopher requests forks in one global
//! total order, so a circular wait cannot form. Concretely, philosopher
//! `N - 1` is the only one that takes its right fork (id 0) before its left
//! (id `N - 1`), and that single reversal is what breaks the cycle.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::fork::Fork;
use crate::registry::{PhilosopherState, StateRegistry};

/// One seat at the table: an id, the two adjacent forks, and the shared
/// state table. Plain data plus a transition loop; the task that runs it is
/// the orchestrator's business.
#[derive(Debug, Clone)]
pub struct Philosopher {
    id: usize,
    left: Arc<Fork>,
    right: Arc<Fork>,
    registry: Arc<StateRegistry>,
    think_duration: Duration,
    eat_duration: Duration,
    duration_jitter: f64,
}

impl Philosopher {
    pub fn new(
        id: usize,
        left: Arc<Fork>,
        right: Arc<Fork>,
        registry: Arc<StateRegistry>,
        config: &SimulationConfig,
    ) -> Self {
        Self {
            id,
            left,
            right,
            registry,
            think_duration: config.think_duration,
            eat_duration: config.eat_duration,
            duration_jitter: config.duration_jitter,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// The fork ids this philosopher acquires, in order: lower id first,
    /// higher id second, regardless of which side each fork sits on.
    pub fn acquisition_order(&self) -> (usize, usize) {
        let (l, r) = (self.left.id(), self.right.id());
        (l.min(r), l.max(r))
    }

    /// Drives the cycle until `cancel` fires. Cancellation is observed during
    /// the think sleep and at the end of each cycle, never while blocked on a
    /// fork acquire, so a stopping philosopher always leaves both forks on
    /// the table and is recorded as thinking.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), SimulationError> {
        debug!(philosopher = self.id, "philosopher seated");
        if cancel.is_cancelled() {
            return Ok(());
        }
        // The registry already records everyone as thinking; announce it once
        // so observers see the full cycle from the first event.
        self.set_state(PhilosopherState::Thinking)?;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = sleep(self.jittered(self.think_duration)) => {}
            }

            self.set_state(PhilosopherState::Hungry)?;
            let (first, second) = self.forks_in_order();
            first.acquire(self.id).await;
            second.acquire(self.id).await;

            self.set_state(PhilosopherState::Eating)?;
            sleep(self.jittered(self.eat_duration)).await;

            // Back to thinking before either fork goes down: the registry
            // must never show an eater that does not hold both forks.
            // Thinking while still holding them violates nothing.
            self.set_state(PhilosopherState::Thinking)?;

            // Release order does not matter for correctness; attempt both so
            // one fault cannot leave the other fork held forever.
            let left = self.left.release(self.id);
            let right = self.right.release(self.id);
            left?;
            right?;

            if cancel.is_cancelled() {
                break;
            }
        }
        debug!(philosopher = self.id, "philosopher left the table");
        Ok(())
    }

    /// References to the two forks in acquisition order.
    fn forks_in_order(&self) -> (&Arc<Fork>, &Arc<Fork>) {
        let (first, _) = self.acquisition_order();
        if self.left.id() == first {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        }
    }

    fn set_state(&self, state: PhilosopherState) -> Result<(), SimulationError> {
        self.registry.set_state(self.id, state)?;
        Ok(())
    }

    fn jittered(&self, base: Duration) -> Duration {
        if self.duration_jitter == 0.0 {
            return base;
        }
        let swing = rand::thread_rng().gen_range(-1.0..=1.0) * self.duration_jitter;
        base.mul_f64((1.0 + swing).max(0.0))
    }
}
