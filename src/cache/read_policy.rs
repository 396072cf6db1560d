//! Read Policy Module
//!
//! How `get` is resolved against the cache map and the data source.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::eviction::normalize_name;
use crate::error::{CacheError, Result};
use crate::source::DataSource;

/// Delay before a refresh-ahead reload when no interval is configured.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(1000);

// == Read Outcome ==
/// What a read policy found for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome<V> {
    /// Served from the cache map
    Hit(V),
    /// Missing from the cache, loaded from the data source and inserted
    Loaded(V),
    /// Neither the cache nor the data source had it
    Absent,
}

impl<V> ReadOutcome<V> {
    pub fn into_value(self) -> Option<V> {
        match self {
            ReadOutcome::Hit(value) | ReadOutcome::Loaded(value) => Some(value),
            ReadOutcome::Absent => None,
        }
    }
}

// == Read Policy ==
/// Strategy for resolving reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPolicy {
    /// Cache map only; the data source is never consulted
    Simple,
    /// Misses are loaded synchronously from the data source
    #[default]
    ReadThrough,
    /// Like ReadThrough, and every hit schedules a reload after `interval`
    RefreshAhead { interval: Duration },
}

impl ReadPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            ReadPolicy::Simple => "Simple",
            ReadPolicy::ReadThrough => "ReadThrough",
            ReadPolicy::RefreshAhead { .. } => "RefreshAhead",
        }
    }

    /// Replaces the refresh interval; other variants are returned unchanged.
    pub fn with_refresh_interval(self, interval: Duration) -> Self {
        match self {
            ReadPolicy::RefreshAhead { .. } => ReadPolicy::RefreshAhead { interval },
            other => other,
        }
    }

    /// The delay after which a hit should be reloaded, if this policy reloads.
    pub fn refresh_interval(&self) -> Option<Duration> {
        match self {
            ReadPolicy::RefreshAhead { interval } => Some(*interval),
            _ => None,
        }
    }

    // == Read ==
    /// Resolves `key`, inserting into `entries` when the data source fills a miss.
    ///
    /// A fetch error is returned as-is and leaves `entries` untouched. Policies
    /// that need a data source reject the call when none is configured.
    pub async fn read<K, V>(
        &self,
        entries: &mut HashMap<K, V>,
        key: &K,
        source: Option<&dyn DataSource<K, V>>,
    ) -> Result<ReadOutcome<V>>
    where
        K: Eq + Hash + Clone + Send + Sync,
        V: Clone + Send + Sync,
    {
        let source = match (self, source) {
            (ReadPolicy::Simple, _) => {
                return Ok(entries
                    .get(key)
                    .cloned()
                    .map_or(ReadOutcome::Absent, ReadOutcome::Hit));
            }
            (_, Some(source)) => source,
            (_, None) => {
                return Err(CacheError::Unsupported {
                    policy: self.name(),
                    operation: "reads without a data source",
                })
            }
        };

        if let Some(value) = entries.get(key) {
            return Ok(ReadOutcome::Hit(value.clone()));
        }

        match source.fetch(key).await? {
            Some(value) => {
                entries.insert(key.clone(), value.clone());
                Ok(ReadOutcome::Loaded(value))
            }
            None => Ok(ReadOutcome::Absent),
        }
    }
}

impl fmt::Display for ReadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReadPolicy {
    type Err = CacheError;

    /// Parses a policy name; `RefreshAhead` gets [`DEFAULT_REFRESH_INTERVAL`].
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "simple" => Ok(ReadPolicy::Simple),
            "readthrough" => Ok(ReadPolicy::ReadThrough),
            "refreshahead" => Ok(ReadPolicy::RefreshAhead {
                interval: DEFAULT_REFRESH_INTERVAL,
            }),
            _ => Err(CacheError::Config(format!("unknown read policy '{}'", s))),
        }
    }
}
