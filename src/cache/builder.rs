//! Cache builder wiring capacity, policies and data source into an engine.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use policy_cache::cache::{CacheBuilder, EvictionStrategy, ReadPolicy, WritePolicy};
//! use policy_cache::source::MemoryDataSource;
//!
//! # tokio_test::block_on(async {
//! let source = Arc::new(MemoryDataSource::<String, String>::new());
//! let cache = CacheBuilder::new(100)
//!     .eviction(EvictionStrategy::Fifo)
//!     .read_policy(ReadPolicy::ReadThrough)
//!     .write_policy(WritePolicy::WriteAlways)
//!     .data_source(source)
//!     .build()
//!     .unwrap();
//!
//! cache.put("hello".to_string(), "world".to_string()).await.unwrap();
//! assert_eq!(cache.get(&"hello".to_string()).await.unwrap(), Some("world".to_string()));
//! # });
//! ```

use std::sync::Arc;

use tracing::info;

use crate::cache::{CacheEngine, CacheKey, CacheValue, EvictionStrategy, ReadPolicy, WritePolicy};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::source::DataSource;

/// Fluent construction of a [`CacheEngine`].
///
/// Defaults to LRU eviction, read-through reads and write-always writes.
pub struct CacheBuilder<K, V> {
    max_size: usize,
    eviction: EvictionStrategy,
    read_policy: ReadPolicy,
    write_policy: WritePolicy,
    source: Option<Arc<dyn DataSource<K, V>>>,
}

impl<K: CacheKey, V: CacheValue> CacheBuilder<K, V> {
    pub fn new(max_size: usize) -> Self {
        Self {
            max_size,
            eviction: EvictionStrategy::default(),
            read_policy: ReadPolicy::default(),
            write_policy: WritePolicy::default(),
            source: None,
        }
    }

    /// Takes capacity and the three policies from a loaded [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.max_size)
            .eviction(config.eviction)
            .read_policy(config.read_policy)
            .write_policy(config.write_policy)
    }

    pub fn eviction(mut self, eviction: EvictionStrategy) -> Self {
        self.eviction = eviction;
        self
    }

    pub fn read_policy(mut self, read_policy: ReadPolicy) -> Self {
        self.read_policy = read_policy;
        self
    }

    pub fn write_policy(mut self, write_policy: WritePolicy) -> Self {
        self.write_policy = write_policy;
        self
    }

    pub fn data_source(mut self, source: Arc<dyn DataSource<K, V>>) -> Self {
        self.source = Some(source);
        self
    }

    /// Validates the settings and creates the engine.
    ///
    /// A zero capacity is a configuration error.
    pub fn build(self) -> Result<CacheEngine<K, V>> {
        if self.max_size == 0 {
            return Err(CacheError::Config(
                "max size must be greater than zero".to_string(),
            ));
        }

        info!(
            max_size = self.max_size,
            eviction = %self.eviction,
            read_policy = %self.read_policy,
            write_policy = %self.write_policy,
            data_source = self.source.is_some(),
            "Cache engine configured"
        );

        Ok(CacheEngine::new(
            self.max_size,
            self.eviction,
            self.read_policy,
            self.write_policy,
            self.source,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryDataSource;
    use std::time::Duration;

    #[test]
    fn test_zero_capacity_rejected() {
        let result = CacheBuilder::<String, String>::new(0).build();
        assert!(matches!(result, Err(CacheError::Config(_))));
    }

    #[test]
    fn test_builder_defaults() {
        let cache = CacheBuilder::<String, String>::new(10).build().unwrap();
        assert_eq!(cache.max_size(), 10);
        assert_eq!(cache.eviction(), EvictionStrategy::Lru);
        assert_eq!(cache.read_policy(), ReadPolicy::ReadThrough);
        assert_eq!(cache.write_policy(), WritePolicy::WriteAlways);
    }

    #[test]
    fn test_from_config() {
        let config = Config {
            max_size: 3,
            eviction: EvictionStrategy::Fifo,
            read_policy: ReadPolicy::RefreshAhead {
                interval: Duration::from_millis(250),
            },
            write_policy: WritePolicy::WriteBehind,
            ..Config::default()
        };

        let cache = CacheBuilder::<String, String>::from_config(&config)
            .data_source(Arc::new(MemoryDataSource::<String, String>::new()))
            .build()
            .unwrap();

        assert_eq!(cache.max_size(), 3);
        assert_eq!(cache.eviction(), EvictionStrategy::Fifo);
        assert_eq!(
            cache.read_policy().refresh_interval(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(cache.write_policy(), WritePolicy::WriteBehind);
    }
}
