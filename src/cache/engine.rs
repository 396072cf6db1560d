//! Cache Engine Module
//!
//! Bounded key-value cache combining a HashMap, an eviction order and the
//! configured read, write and eviction policies behind one exclusive lock.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::cache::{
    CacheStats, EvictionOrder, EvictionStrategy, ReadOutcome, ReadPolicy, WriteOutcome,
    WritePolicy,
};
use crate::error::Result;
use crate::source::DataSource;
use crate::tasks::{spawn_refresh, spawn_write_behind_worker, WriteJob};

// == Key / Value Bounds ==
/// Requirements on cache keys.
pub trait CacheKey: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

impl<T> CacheKey for T where T: Eq + Hash + Clone + Debug + Send + Sync + 'static {}

/// Requirements on cache values.
pub trait CacheValue: Clone + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Clone + Send + Sync + 'static {}

// == Pending Refresh ==
/// A scheduled refresh-ahead reload and the ticket it must present to apply its result.
#[derive(Debug)]
pub(crate) struct PendingRefresh {
    ticket: u64,
    handle: AbortHandle,
}

// == Cache State ==
/// Everything guarded by the engine lock.
///
/// `entries` and `order` always hold the same key set and `order` never holds
/// a key twice; every method here leaves both in that shape.
#[derive(Debug)]
pub(crate) struct CacheState<K, V> {
    pub(crate) entries: HashMap<K, V>,
    pub(crate) order: EvictionOrder<K>,
    pub(crate) stats: CacheStats,
    /// Pending refresh-ahead reloads, at most one per key
    pub(crate) refreshes: HashMap<K, PendingRefresh>,
    next_ticket: u64,
}

impl<K: CacheKey, V: CacheValue> CacheState<K, V> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            order: EvictionOrder::new(),
            stats: CacheStats::new(),
            refreshes: HashMap::new(),
            next_ticket: 0,
        }
    }

    /// Drops `key` from the map and the order and cancels its pending refresh.
    fn discard(&mut self, key: &K) -> bool {
        let existed = self.entries.remove(key).is_some();
        self.order.remove(key);
        self.cancel_refresh(key);
        existed
    }

    /// Registers the reload for `key` that was issued `ticket`.
    fn track_refresh(&mut self, key: K, handle: AbortHandle, ticket: u64) {
        self.refreshes.insert(key, PendingRefresh { ticket, handle });
    }

    fn issue_ticket(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    fn cancel_refresh(&mut self, key: &K) -> bool {
        match self.refreshes.remove(key) {
            Some(pending) => {
                pending.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Deregisters the reload holding `ticket`.
    ///
    /// Returns false when the key's reload was cancelled or replaced since the
    /// ticket was issued; the caller must then drop its result.
    pub(crate) fn finish_refresh(&mut self, key: &K, ticket: u64) -> bool {
        match self.refreshes.get(key) {
            Some(pending) if pending.ticket == ticket => {
                self.refreshes.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Evicts until the map fits in `max_size`, never evicting `keep`.
    fn make_room(&mut self, keep: &K, max_size: usize, eviction: EvictionStrategy) {
        while self.entries.len() > max_size {
            let victim = match eviction.select_victim(&self.order) {
                Some(victim) if victim != *keep => victim,
                _ => break,
            };
            self.discard(&victim);
            self.stats.record_eviction();
            debug!(key = ?victim, strategy = %eviction, "Evicted entry");
        }
    }

    fn cancel_refreshes(&mut self) -> usize {
        let cancelled = self.refreshes.len();
        for (_, pending) in self.refreshes.drain() {
            pending.handle.abort();
        }
        cancelled
    }

    /// Replaces the value of a still-cached key without touching the order.
    pub(crate) fn refresh_entry(&mut self, key: &K, value: V) -> bool {
        match self.entries.get_mut(key) {
            Some(slot) => {
                *slot = value;
                self.stats.record_refresh();
                true
            }
            None => false,
        }
    }

    fn sync_entry_count(&mut self) {
        self.stats.set_total_entries(self.entries.len());
    }
}

// == Shared Engine Internals ==
pub(crate) struct Shared<K, V> {
    pub(crate) state: Mutex<CacheState<K, V>>,
    source: Option<Arc<dyn DataSource<K, V>>>,
    eviction: EvictionStrategy,
    read_policy: ReadPolicy,
    write_policy: WritePolicy,
    max_size: usize,
    /// Write-behind queue, spawned on the first deferred store
    write_queue: OnceLock<mpsc::UnboundedSender<WriteJob<K, V>>>,
}

impl<K, V> Shared<K, V> {
    /// Waits until every write-behind store queued so far has been attempted.
    pub(crate) async fn flush_writes(&self) {
        let Some(queue) = self.write_queue.get() else {
            return;
        };
        let (done, wait) = oneshot::channel();
        if queue.send(WriteJob::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

// == Cache Engine ==
/// A bounded cache in front of a [`DataSource`].
///
/// Cloning is cheap and every clone shares the same map. All operations,
/// reads included, take the engine lock exclusively: a hit reorders the
/// eviction order, so a shared lock would not be enough.
///
/// Background work never blocks callers. Write-behind stores run through one
/// ordered queue per engine, and refresh-ahead reloads are tracked per key so
/// that `remove`, `clear` and `shutdown` can cancel them. A reload only ever
/// updates a key that is still cached.
pub struct CacheEngine<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> Clone for CacheEngine<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K: CacheKey, V: CacheValue> CacheEngine<K, V> {
    // == Constructor ==
    /// Creates an engine. Use [`crate::cache::CacheBuilder`] for validated construction.
    pub(crate) fn new(
        max_size: usize,
        eviction: EvictionStrategy,
        read_policy: ReadPolicy,
        write_policy: WritePolicy,
        source: Option<Arc<dyn DataSource<K, V>>>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(CacheState::new()),
                source,
                eviction,
                read_policy,
                write_policy,
                max_size,
                write_queue: OnceLock::new(),
            }),
        }
    }

    // == Put ==
    /// Writes `value` for `key` through the configured write policy.
    ///
    /// A new key that overflows the cache evicts victims chosen by the
    /// eviction strategy. Eviction runs after the write succeeds, so an
    /// overwrite at capacity keeps every entry and a synchronous store failure
    /// returns the error with the cache left as it was. A written value also
    /// supersedes any pending refresh of the key.
    pub async fn put(&self, key: K, value: V) -> Result<()> {
        let shared = &*self.shared;
        let mut guard = shared.state.lock().await;
        let state = &mut *guard;

        let outcome = shared
            .write_policy
            .write(&mut state.entries, &key, value, shared.source.as_deref())
            .await?;

        let written = match outcome {
            WriteOutcome::Deferred(value) => {
                self.enqueue_store(key.clone(), value);
                true
            }
            WriteOutcome::Stored => true,
            WriteOutcome::Skipped => false,
        };
        // a reload in flight may have fetched a value older than this one
        if written && state.cancel_refresh(&key) {
            debug!(?key, "Write superseded pending refresh");
        }

        state.make_room(&key, shared.max_size, shared.eviction);
        shared.eviction.touch(&key, &mut state.order);
        state.sync_entry_count();
        Ok(())
    }

    // == Get ==
    /// Resolves `key` through the configured read policy.
    ///
    /// Returns `Ok(None)` for keys neither cached nor stored.
    pub async fn get(&self, key: &K) -> Result<Option<V>> {
        let shared = &*self.shared;
        let mut guard = shared.state.lock().await;
        let state = &mut *guard;

        let outcome = shared
            .read_policy
            .read(&mut state.entries, key, shared.source.as_deref())
            .await?;

        match &outcome {
            ReadOutcome::Hit(_) => {
                state.stats.record_hit();
                if let Some(interval) = shared.read_policy.refresh_interval() {
                    self.schedule_refresh(state, key, interval);
                }
            }
            ReadOutcome::Loaded(_) => {
                state.stats.record_miss();
                state.stats.record_load();
                state.make_room(key, shared.max_size, shared.eviction);
            }
            ReadOutcome::Absent => {
                state.stats.record_miss();
                return Ok(None);
            }
        }

        shared.eviction.touch(key, &mut state.order);
        state.sync_entry_count();
        Ok(outcome.into_value())
    }

    // == Remove ==
    /// Drops `key` from the cache, then deletes it from the data source.
    ///
    /// Removing an absent key is not an error. Queued write-behind stores are
    /// drained first so a stale store cannot resurrect the key afterwards.
    pub async fn remove(&self, key: &K) -> Result<()> {
        {
            let mut state = self.shared.state.lock().await;
            if state.discard(key) {
                debug!(?key, "Removed entry");
            }
            state.sync_entry_count();
        }

        match &self.shared.source {
            Some(source) => {
                self.flush().await;
                source.delete(key).await?;
            }
            None => debug!(?key, "No data source configured, skipping delete"),
        }
        Ok(())
    }

    // == Clear ==
    /// Empties the cache and cancels pending refreshes. The data source is untouched.
    pub async fn clear(&self) {
        let mut state = self.shared.state.lock().await;
        let cancelled = state.cancel_refreshes();
        let removed = state.entries.len();
        state.entries.clear();
        state.order.clear();
        state.sync_entry_count();
        info!(removed, cancelled_refreshes = cancelled, "Cache cleared");
    }

    // == Flush ==
    /// Waits until every write-behind store queued so far has been attempted.
    pub async fn flush(&self) {
        self.shared.flush_writes().await;
    }

    // == Shutdown ==
    /// Cancels pending refreshes and drains the write-behind queue.
    pub async fn shutdown(&self) {
        let cancelled = self.shared.state.lock().await.cancel_refreshes();
        if cancelled > 0 {
            warn!(cancelled, "Cancelled pending refreshes on shutdown");
        }
        self.flush().await;
        info!("Cache engine shut down");
    }

    // == Inspection ==
    /// Returns the current number of cached entries.
    pub async fn size(&self) -> usize {
        self.shared.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.size().await == 0
    }

    /// Checks the cache map only; never consults the data source or reorders.
    pub async fn contains(&self, key: &K) -> bool {
        self.shared.state.lock().await.entries.contains_key(key)
    }

    /// Keys from next victim to most recently touched.
    pub async fn eviction_order(&self) -> Vec<K> {
        self.shared.state.lock().await.order.iter().cloned().collect()
    }

    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let state = self.shared.state.lock().await;
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    pub fn max_size(&self) -> usize {
        self.shared.max_size
    }

    pub fn eviction(&self) -> EvictionStrategy {
        self.shared.eviction
    }

    pub fn read_policy(&self) -> ReadPolicy {
        self.shared.read_policy
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.shared.write_policy
    }

    // == Background Dispatch ==
    fn enqueue_store(&self, key: K, value: V) {
        let Some(source) = &self.shared.source else {
            return;
        };
        let queue = self.shared.write_queue.get_or_init(|| {
            spawn_write_behind_worker(Arc::downgrade(&self.shared), Arc::clone(source))
        });
        if queue.send(WriteJob::Store { key, value }).is_err() {
            warn!("Write-behind worker is gone, dropping store");
        }
    }

    fn schedule_refresh(&self, state: &mut CacheState<K, V>, key: &K, interval: Duration) {
        if state.refreshes.contains_key(key) {
            return;
        }
        let Some(source) = &self.shared.source else {
            return;
        };
        let ticket = state.issue_ticket();
        let handle = spawn_refresh(
            Arc::downgrade(&self.shared),
            Arc::clone(source),
            key.clone(),
            ticket,
            interval,
        );
        state.track_refresh(key.clone(), handle.abort_handle(), ticket);
        debug!(?key, ?interval, "Scheduled refresh");
    }

    #[cfg(test)]
    pub(crate) async fn assert_consistent(&self) {
        let state = self.shared.state.lock().await;
        assert_eq!(state.entries.len(), state.order.len(), "order length drifted");
        for key in state.order.iter() {
            assert!(state.entries.contains_key(key), "orphan key {:?} in order", key);
        }
        assert!(state.entries.len() <= self.shared.max_size, "capacity exceeded");
    }

    #[cfg(test)]
    pub(crate) async fn pending_refreshes(&self) -> usize {
        self.shared.state.lock().await.refreshes.len()
    }
}
