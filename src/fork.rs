//! Forks - the exclusive resources shared by ring-adjacent philosophers.
//!
//! Fork `i` sits between philosopher `i` and philosopher `(i + 1) % N`.
//! Acquisition blocks until the fork is free; release is checked against the
//! recorded holder so a broken invariant elsewhere surfaces as a hard error
//! instead of silently corrupting the permit count.

use std::sync::Mutex;
use tokio::sync::Semaphore;
use tracing::trace;

/// An exclusive fork with holder diagnostics.
#[derive(Debug)]
pub struct Fork {
    id: usize,
    permit: Semaphore,
    holder: Mutex<Option<usize>>,
}

impl Fork {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            permit: Semaphore::new(1),
            holder: Mutex::new(None),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Waits until the fork is free, then takes it on behalf of `philosopher`.
    ///
    /// At most one philosopher holds the fork at any instant; everyone else
    /// queues on the underlying semaphore with whatever fairness it provides.
    pub async fn acquire(&self, philosopher: usize) {
        // The semaphore is created with one permit and never closed.
        let permit = self
            .permit
            .acquire()
            .await
            .expect("fork semaphore unexpectedly closed");
        permit.forget();
        *self.holder.lock().expect("fork holder lock poisoned") = Some(philosopher);
        trace!(fork = self.id, philosopher, "fork acquired");
    }

    /// Returns the fork to the table.
    ///
    /// Releasing a fork that is free, or that is held by someone else, is a
    /// programming-error fault: the permit count is left untouched so the
    /// actual holder is unaffected.
    pub fn release(&self, philosopher: usize) -> Result<(), ForkError> {
        let mut holder = self.holder.lock().expect("fork holder lock poisoned");
        match *holder {
            Some(current) if current == philosopher => {
                *holder = None;
                self.permit.add_permits(1);
                trace!(fork = self.id, philosopher, "fork released");
                Ok(())
            }
            Some(held_by) => Err(ForkError::ReleaseByNonHolder {
                fork: self.id,
                philosopher,
                held_by,
            }),
            None => Err(ForkError::ReleaseWithoutHold {
                fork: self.id,
                philosopher,
            }),
        }
    }

    /// Which philosopher currently holds this fork, if any.
    pub fn holder(&self) -> Option<usize> {
        *self.holder.lock().expect("fork holder lock poisoned")
    }

    pub fn is_free(&self) -> bool {
        self.holder().is_none()
    }
}

/// Invariant violations on a fork. These are never retried; they indicate a
/// bug in whoever drove the fork.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ForkError {
    #[error("philosopher {philosopher} released fork {fork} which was not held")]
    ReleaseWithoutHold { fork: usize, philosopher: usize },

    #[error("philosopher {philosopher} released fork {fork} held by philosopher {held_by}")]
    ReleaseByNonHolder {
        fork: usize,
        philosopher: usize,
        held_by: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn acquire_records_holder_and_release_clears_it() {
        let fork = Fork::new(3);
        assert!(fork.is_free());

        fork.acquire(1).await;
        assert_eq!(fork.holder(), Some(1));

        fork.release(1).unwrap();
        assert!(fork.is_free());
    }

    #[tokio::test]
    async fn double_release_is_a_fault() {
        let fork = Fork::new(0);
        fork.acquire(2).await;
        fork.release(2).unwrap();

        let err = fork.release(2).unwrap_err();
        assert_eq!(
            err,
            ForkError::ReleaseWithoutHold {
                fork: 0,
                philosopher: 2
            }
        );
    }

    #[tokio::test]
    async fn release_by_non_holder_is_a_fault() {
        let fork = Fork::new(7);
        fork.acquire(4).await;

        let err = fork.release(5).unwrap_err();
        assert_eq!(
            err,
            ForkError::ReleaseByNonHolder {
                fork: 7,
                philosopher: 5,
                held_by: 4
            }
        );

        // The real holder can still put it back.
        fork.release(4).unwrap();
        assert!(fork.is_free());
    }

    #[tokio::test]
    async fn second_acquirer_waits_until_release() {
        use std::sync::Arc;

        let fork = Arc::new(Fork::new(1));
        fork.acquire(0).await;

        let contender = {
            let fork = Arc::clone(&fork);
            tokio::spawn(async move {
                fork.acquire(1).await;
                fork.holder()
            })
        };

        // The contender cannot finish while we hold the fork.
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!contender.is_finished());
        assert_eq!(fork.holder(), Some(0));

        fork.release(0).unwrap();
        assert_eq!(contender.await.unwrap(), Some(1));
    }
}
