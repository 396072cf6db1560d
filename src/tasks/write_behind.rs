//! Write-Behind Worker
//!
//! Background task that persists deferred stores in the order they were queued.

use std::sync::{Arc, Weak};

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheValue, Shared};
use crate::source::DataSource;

/// A unit of work for the write-behind worker.
pub(crate) enum WriteJob<K, V> {
    /// Persist `value` under `key`
    Store { key: K, value: V },
    /// Signal once every job queued before this one has been attempted
    Flush(oneshot::Sender<()>),
}

/// Spawns the write-behind worker for one engine and returns its queue.
///
/// Jobs are handled one at a time, so stores for the same key reach the data
/// source in the order the puts happened. Failed stores are logged and counted
/// in the engine statistics; they are not retried. The worker only holds a weak
/// reference to the engine and exits once the engine and its queue are dropped.
pub(crate) fn spawn_write_behind_worker<K: CacheKey, V: CacheValue>(
    engine: Weak<Shared<K, V>>,
    source: Arc<dyn DataSource<K, V>>,
) -> mpsc::UnboundedSender<WriteJob<K, V>> {
    let (queue, mut jobs) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        debug!("Write-behind worker started");

        while let Some(job) = jobs.recv().await {
            match job {
                WriteJob::Store { key, value } => match source.store(&key, &value).await {
                    Ok(()) => debug!(?key, "Write-behind store completed"),
                    Err(err) => {
                        warn!(?key, error = %err, "Write-behind store failed");
                        if let Some(engine) = engine.upgrade() {
                            engine.state.lock().await.stats.record_background_failure();
                        }
                    }
                },
                WriteJob::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }

        debug!("Write-behind worker stopped");
    });

    queue
}
