//! Configuration Module
//!
//! Handles loading cache and server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{EvictionStrategy, ReadPolicy, WritePolicy, DEFAULT_REFRESH_INTERVAL};
use crate::error::{CacheError, Result};

/// Cache and server configuration parameters.
///
/// Every value can be set through an environment variable. Missing variables
/// fall back to the defaults; present but invalid ones are configuration
/// errors, so a typo in a policy name stops startup instead of silently
/// picking a default.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub max_size: usize,
    /// Which entry leaves a full cache
    pub eviction: EvictionStrategy,
    /// How reads are resolved (with the refresh interval for RefreshAhead)
    pub read_policy: ReadPolicy,
    /// How writes reach the data source
    pub write_policy: WritePolicy,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_SIZE` - Maximum cache entries, greater than zero (default: 1000)
    /// - `EVICTION_STRATEGY` - `FIFO` or `LRU` (default: LRU)
    /// - `READ_POLICY` - `Simple`, `ReadThrough` or `RefreshAhead` (default: ReadThrough)
    /// - `REFRESH_INTERVAL_MS` - Refresh-ahead delay in milliseconds (default: 1000)
    /// - `WRITE_POLICY` - `WriteAlways`, `WriteBehind` or `WriteIfAbsent` (default: WriteAlways)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a Config from any variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_size = parse_var(&lookup, "MAX_SIZE")?.unwrap_or(defaults.max_size);
        if max_size == 0 {
            return Err(CacheError::Config(
                "MAX_SIZE must be greater than zero".to_string(),
            ));
        }

        let refresh_interval = parse_var::<u64, _>(&lookup, "REFRESH_INTERVAL_MS")?
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL);

        let read_policy = parse_var::<ReadPolicy, _>(&lookup, "READ_POLICY")?
            .unwrap_or(defaults.read_policy)
            .with_refresh_interval(refresh_interval);

        Ok(Self {
            max_size,
            eviction: parse_var(&lookup, "EVICTION_STRATEGY")?.unwrap_or(defaults.eviction),
            read_policy,
            write_policy: parse_var(&lookup, "WRITE_POLICY")?.unwrap_or(defaults.write_policy),
            server_port: parse_var(&lookup, "SERVER_PORT")?.unwrap_or(defaults.server_port),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: 1000,
            eviction: EvictionStrategy::Lru,
            read_policy: ReadPolicy::ReadThrough,
            write_policy: WritePolicy::WriteAlways,
            server_port: 3000,
        }
    }
}

/// Parses variable `name` if it is set.
fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|err| CacheError::Config(format!("{}: {}", name, err))),
    }
}
