//! Eviction Task
//!
//! Background timer that periodically runs the cache store's sweep.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;

/// Handle to the periodic sweep task.
///
/// Unlike a bare `JoinHandle::abort`, shutdown here is cooperative: the
/// signal stops the loop at the next tick, an in-flight sweep is allowed to
/// finish, and `shutdown` only returns once the task has exited. The store
/// must stay open until then.
#[derive(Debug)]
pub struct EvictionTask {
    stop: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl EvictionTask {
    // == Spawn ==
    /// Spawns the sweep loop with the given period.
    ///
    /// Sweep failures are logged and swallowed; the next tick retries.
    pub fn spawn(store: Arc<CacheStore>, period: Duration) -> Self {
        let (stop, mut stopped) = watch::channel(false);

        let handle = tokio::spawn(async move {
            info!(period_ms = period.as_millis() as u64, "eviction task started");
            let mut ticker = tokio::time::interval(period);
            // The first interval tick fires immediately; skip it so the
            // first sweep happens one full period after startup.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match store.sweep().await {
                            Ok(outcome) if outcome.expired + outcome.evicted > 0 => {
                                info!(
                                    expired = outcome.expired,
                                    evicted = outcome.evicted,
                                    "eviction sweep removed entries"
                                );
                            }
                            Ok(_) => debug!("eviction sweep found nothing to remove"),
                            Err(e) => warn!("eviction sweep failed, retrying next cycle: {e}"),
                        }
                    }
                    _ = stopped.changed() => {
                        info!("eviction task stopping");
                        break;
                    }
                }
            }
        });

        Self { stop, handle }
    }

    // == Shutdown ==
    /// Signals the loop to stop and waits for it to exit.
    pub async fn shutdown(self) {
        let _ = self.stop.send(true);
        if let Err(e) = self.handle.await {
            warn!("eviction task did not shut down cleanly: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store(lru_capacity: u32) -> Arc<CacheStore> {
        Arc::new(
            CacheStore::open("sqlite::memory:", Duration::from_secs(300), lru_capacity)
                .await
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_eviction_task_removes_expired_entries() {
        let store = test_store(100).await;

        store
            .put("expire_soon", &"value".to_string(), Some(Duration::from_millis(10)))
            .await
            .unwrap();

        let task = EvictionTask::spawn(store.clone(), Duration::from_millis(50));

        // Wait for the entry to expire and at least one sweep to run.
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(store.len().await.unwrap(), 0, "sweep should reclaim the row");
        task.shutdown().await;
    }

    #[tokio::test]
    async fn test_eviction_task_preserves_valid_entries() {
        let store = test_store(100).await;

        store
            .put("long_lived", &"value".to_string(), Some(Duration::from_secs(3600)))
            .await
            .unwrap();

        let task = EvictionTask::spawn(store.clone(), Duration::from_millis(30));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let value: Option<String> = store.get("long_lived").await.unwrap();
        assert_eq!(value, Some("value".to_string()));
        task.shutdown().await;
    }

    #[tokio::test]
    async fn test_eviction_task_shutdown_stops_sweeping() {
        let store = test_store(100).await;

        let task = EvictionTask::spawn(store.clone(), Duration::from_millis(20));
        task.shutdown().await;

        // Entries written after shutdown expire but are never swept.
        store
            .put("late", &"value".to_string(), Some(Duration::from_millis(10)))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_resolves_promptly_without_ticks() {
        let store = test_store(100).await;

        // Hour-long period: shutdown must not wait for a tick.
        let task = EvictionTask::spawn(store, Duration::from_secs(3600));
        tokio::time::timeout(Duration::from_secs(1), task.shutdown())
            .await
            .expect("shutdown should not block until the next tick");
    }
}
