//! Write Policy Module
//!
//! How `put` propagates to the cache map and the data source.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use crate::cache::eviction::normalize_name;
use crate::error::{CacheError, Result};
use crate::source::DataSource;

// == Write Outcome ==
/// What a write policy did with a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome<V> {
    /// Written to the data source and the cache map
    Stored,
    /// Written to the cache map; the store write still has to be dispatched
    Deferred(V),
    /// Nothing written because the key was already cached
    Skipped,
}

// == Write Policy ==
/// Strategy for propagating writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Synchronous store, then cache insert
    #[default]
    WriteAlways,
    /// Cache insert now, store write in the background
    WriteBehind,
    /// WriteAlways for new keys, no-op for cached ones
    WriteIfAbsent,
}

impl WritePolicy {
    pub fn name(&self) -> &'static str {
        match self {
            WritePolicy::WriteAlways => "WriteAlways",
            WritePolicy::WriteBehind => "WriteBehind",
            WritePolicy::WriteIfAbsent => "WriteIfAbsent",
        }
    }

    // == Write ==
    /// Applies `value` for `key` to `entries` and, synchronously or not, the data source.
    ///
    /// Synchronous stores happen before the map insert, so a store error
    /// leaves `entries` exactly as it was.
    pub async fn write<K, V>(
        &self,
        entries: &mut HashMap<K, V>,
        key: &K,
        value: V,
        source: Option<&dyn DataSource<K, V>>,
    ) -> Result<WriteOutcome<V>>
    where
        K: Eq + Hash + Clone + Send + Sync,
        V: Clone + Send + Sync,
    {
        let source = source.ok_or(CacheError::Unsupported {
            policy: self.name(),
            operation: "writes without a data source",
        })?;

        match self {
            WritePolicy::WriteIfAbsent if entries.contains_key(key) => Ok(WriteOutcome::Skipped),
            WritePolicy::WriteAlways | WritePolicy::WriteIfAbsent => {
                source.store(key, &value).await?;
                entries.insert(key.clone(), value);
                Ok(WriteOutcome::Stored)
            }
            WritePolicy::WriteBehind => {
                entries.insert(key.clone(), value.clone());
                Ok(WriteOutcome::Deferred(value))
            }
        }
    }
}

impl fmt::Display for WritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WritePolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "writealways" => Ok(WritePolicy::WriteAlways),
            "writebehind" => Ok(WritePolicy::WriteBehind),
            "writeifabsent" => Ok(WritePolicy::WriteIfAbsent),
            _ => Err(CacheError::Config(format!("unknown write policy '{}'", s))),
        }
    }
}
