//! Refresh-Ahead Task
//!
//! Background reload of a cached entry after a fixed delay.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheValue, Shared};
use crate::source::DataSource;

/// Spawns a one-shot reload of `key`.
///
/// After `delay` the write-behind queue is drained, so the fetch cannot read
/// a value older than one already queued, and the value is fetched without
/// holding the engine lock. The lock is then taken and the result applied
/// only if this reload still holds `ticket` for the key. A `put`, `remove`,
/// `clear`, eviction or `shutdown` since scheduling withdraws the ticket and
/// the fetched value is dropped. The eviction order is left alone. Fetch
/// failures are logged and counted.
///
/// The task holds only a weak reference to the engine and does nothing if
/// the engine is gone.
pub(crate) fn spawn_refresh<K: CacheKey, V: CacheValue>(
    engine: Weak<Shared<K, V>>,
    source: Arc<dyn DataSource<K, V>>,
    key: K,
    ticket: u64,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        match engine.upgrade() {
            Some(shared) => shared.flush_writes().await,
            None => return,
        }
        let fetched = source.fetch(&key).await;

        let Some(engine) = engine.upgrade() else {
            return;
        };
        let mut state = engine.state.lock().await;
        if !state.finish_refresh(&key, ticket) {
            debug!(?key, ticket, "Refresh superseded, dropping fetched value");
            return;
        }

        match fetched {
            Ok(Some(value)) => {
                if state.refresh_entry(&key, value) {
                    debug!(?key, "Refreshed cached entry");
                } else {
                    debug!(?key, "Entry left the cache before refresh completed");
                }
            }
            Ok(None) => debug!(?key, "Data source has no value, keeping cached entry"),
            Err(err) => {
                warn!(?key, error = %err, "Refresh fetch failed");
                state.stats.record_background_failure();
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryDataSource;

    #[tokio::test]
    async fn test_refresh_without_engine_does_not_fetch() {
        let source = Arc::new(MemoryDataSource::<u32, u32>::new());

        let handle = spawn_refresh(Weak::new(), source.clone(), 1, 0, Duration::from_millis(5));
        handle.await.unwrap();

        assert_eq!(source.fetch_count(&1).await, 0);
    }

    #[tokio::test]
    async fn test_refresh_can_be_aborted() {
        let source = Arc::new(MemoryDataSource::<u32, u32>::new());

        let handle = spawn_refresh(Weak::new(), source.clone(), 1, 0, Duration::from_secs(60));
        handle.abort();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
