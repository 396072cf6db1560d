//! Data Source Module
//!
//! The backing-store contract the cache engine sits in front of.

mod memory;

use async_trait::async_trait;

use crate::error::DataSourceError;

pub use memory::MemoryDataSource;

// == Data Source ==
/// A persistent store addressed one key at a time.
///
/// Implementations report failures instead of hiding them; the engine decides
/// whether a failure reaches the caller (synchronous paths) or only the logs
/// (write-behind stores, refresh-ahead fetches). Retries, if any, belong here.
#[async_trait]
pub trait DataSource<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    /// Loads the value for `key`, `Ok(None)` when the store has none.
    async fn fetch(&self, key: &K) -> Result<Option<V>, DataSourceError>;

    /// Persists `value` under `key`.
    async fn store(&self, key: &K, value: &V) -> Result<(), DataSourceError>;

    /// Deletes `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &K) -> Result<(), DataSourceError>;
}
