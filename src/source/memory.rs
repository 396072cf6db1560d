//! In-Memory Data Source
//!
//! A HashMap-backed store with call accounting, used by the demo server and tests.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::DataSource;
use crate::error::DataSourceError;

// == Call Counts ==
#[derive(Debug, Clone, Copy, Default)]
struct CallCounts {
    fetches: usize,
    stores: usize,
    deletes: usize,
}

// == Memory Data Source ==
/// Backing store kept entirely in memory.
///
/// Every call is counted per key so callers can assert how often the cache
/// reached through to the store. `set_failing(true)` makes every call fail
/// with [`DataSourceError::Unavailable`].
#[derive(Debug)]
pub struct MemoryDataSource<K, V> {
    /// Persisted records
    records: RwLock<HashMap<K, V>>,
    /// Per-key call counters
    calls: RwLock<HashMap<K, CallCounts>>,
    /// Failure injection switch
    failing: AtomicBool,
    /// Artificial delay applied to every call
    latency: Option<Duration>,
}

impl<K, V> MemoryDataSource<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            calls: RwLock::new(HashMap::new()),
            failing: AtomicBool::new(false),
            latency: None,
        }
    }

    /// Creates an empty store whose calls each sleep for `latency` first.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::new()
        }
    }

    // == Seed ==
    /// Writes a record directly, bypassing call accounting.
    pub async fn seed(&self, key: K, value: V) {
        self.records.write().await.insert(key, value);
    }

    // == Inspection ==
    /// Returns the persisted value for `key`, bypassing call accounting.
    pub async fn value(&self, key: &K) -> Option<V> {
        self.records.read().await.get(key).cloned()
    }

    /// Number of persisted records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn fetch_count(&self, key: &K) -> usize {
        self.counts(key).await.fetches
    }

    pub async fn store_count(&self, key: &K) -> usize {
        self.counts(key).await.stores
    }

    pub async fn delete_count(&self, key: &K) -> usize {
        self.counts(key).await.deletes
    }

    // == Failure Injection ==
    /// Makes every subsequent call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    async fn counts(&self, key: &K) -> CallCounts {
        self.calls
            .read()
            .await
            .get(key)
            .copied()
            .unwrap_or_default()
    }

    /// Records a call, applies latency and failure injection.
    async fn enter(
        &self,
        key: &K,
        record: impl FnOnce(&mut CallCounts),
    ) -> Result<(), DataSourceError> {
        record(self.calls.write().await.entry(key.clone()).or_default());

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(DataSourceError::Unavailable(
                "memory data source is failing".to_string(),
            ));
        }
        Ok(())
    }
}

impl<K, V> Default for MemoryDataSource<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> DataSource<K, V> for MemoryDataSource<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn fetch(&self, key: &K) -> Result<Option<V>, DataSourceError> {
        self.enter(key, |c| c.fetches += 1).await?;
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn store(&self, key: &K, value: &V) -> Result<(), DataSourceError> {
        self.enter(key, |c| c.stores += 1).await?;
        self.records
            .write()
            .await
            .insert(key.clone(), value.clone());
        Ok(())
    }

    async fn delete(&self, key: &K) -> Result<(), DataSourceError> {
        self.enter(key, |c| c.deletes += 1).await?;
        self.records.write().await.remove(key);
        Ok(())
    }
}
