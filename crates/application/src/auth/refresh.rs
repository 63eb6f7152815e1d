//! Single-flight coordination of token refreshes.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ClientError;

/// Serializes token refreshes so at most one runs at a time.
///
/// Callers snapshot [`generation`](Self::generation) before issuing a
/// request. When the request comes back 401 they call [`run`](Self::run):
/// the first caller to take the lock with a still current snapshot
/// performs the refresh and bumps the generation; everyone else adopts
/// that cycle's outcome without touching the network.
#[derive(Debug, Default)]
pub struct RefreshCoordinator {
    generation: AtomicU64,
    cycle: Mutex<LastCycle>,
}

#[derive(Debug, Default)]
struct LastCycle {
    failed: bool,
}

impl RefreshCoordinator {
    /// Creates a coordinator with no completed cycles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the refresh generation.
    ///
    /// Taken before a request goes out, so a later 401 can tell whether a
    /// refresh already completed in the meantime. Never blocks.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Runs a refresh cycle, or adopts the one that already ran.
    ///
    /// `observed` is the generation snapshot taken before the request
    /// that came back 401. If the generation still matches once the lock
    /// is held, `refresh` executes and its outcome is recorded for later
    /// arrivals; otherwise the recorded outcome of the completed cycle is
    /// returned without running `refresh` at all.
    ///
    /// # Errors
    ///
    /// Propagates the refresh failure to the caller that ran it, and
    /// reports [`ClientError::SessionExpired`] to callers adopting a
    /// failed cycle.
    pub async fn run<F, Fut>(&self, observed: u64, refresh: F) -> Result<(), ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), ClientError>>,
    {
        let mut cycle = self.cycle.lock().await;

        if self.generation.load(Ordering::Acquire) != observed {
            // A refresh completed while this caller waited for the lock.
            debug!(failed = cycle.failed, "adopting completed refresh cycle");
            return if cycle.failed {
                Err(ClientError::SessionExpired)
            } else {
                Ok(())
            };
        }

        let outcome = refresh().await;
        cycle.failed = outcome.is_err();
        self.generation.fetch_add(1, Ordering::Release);
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_refresh() {
        let coordinator = Arc::new(RefreshCoordinator::new());
        let refreshes = Arc::new(AtomicUsize::new(0));
        let observed = coordinator.generation();

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let coordinator = Arc::clone(&coordinator);
            let refreshes = Arc::clone(&refreshes);
            tasks.push(tokio::spawn(async move {
                coordinator
                    .run(observed, || async {
                        refreshes.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        Ok(())
                    })
                    .await
            }));
        }

        for task in tasks {
            assert!(task.await.unwrap().is_ok());
        }
        assert_eq!(refreshes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_adopters_see_shared_failure_as_expired() {
        let coordinator = Arc::new(RefreshCoordinator::new());
        let observed = coordinator.generation();

        let leader = coordinator
            .run(observed, || async { Err(ClientError::Network("refused".to_owned())) })
            .await;
        assert_eq!(leader, Err(ClientError::Network("refused".to_owned())));

        let refreshes = AtomicUsize::new(0);
        let adopter = coordinator
            .run(observed, || async {
                refreshes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert_eq!(adopter, Err(ClientError::SessionExpired));
        assert_eq!(refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stale_observer_adopts_success_without_running() {
        let coordinator = RefreshCoordinator::new();
        let observed = coordinator.generation();

        coordinator.run(observed, || async { Ok(()) }).await.unwrap();

        let refreshes = AtomicUsize::new(0);
        let adopted = coordinator
            .run(observed, || async {
                refreshes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(adopted.is_ok());
        assert_eq!(refreshes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fresh_observation_starts_a_new_cycle() {
        let coordinator = RefreshCoordinator::new();
        let refreshes = AtomicUsize::new(0);

        let first = coordinator.generation();
        coordinator
            .run(first, || async {
                refreshes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap();

        let second = coordinator.generation();
        assert_ne!(first, second);
        coordinator
            .run(second, || async {
                refreshes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(refreshes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_does_not_poison_later_cycles() {
        let coordinator = RefreshCoordinator::new();

        let first = coordinator.generation();
        let failed = coordinator
            .run(first, || async { Err(ClientError::SessionExpired) })
            .await;
        assert!(failed.is_err());

        let second = coordinator.generation();
        let recovered = coordinator.run(second, || async { Ok(()) }).await;
        assert!(recovered.is_ok());
    }
}
