//! Eviction Module
//!
//! Eviction order tracking and the FIFO / LRU strategies that drive it.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::error::CacheError;

// == Eviction Order ==
/// Keys in eviction priority.
///
/// Keys are stored in a VecDeque where:
/// - Front = next victim
/// - Back = most recently inserted (FIFO) or used (LRU)
#[derive(Debug)]
pub struct EvictionOrder<K> {
    order: VecDeque<K>,
}

impl<K: PartialEq> EvictionOrder<K> {
    // == Constructor ==
    /// Creates a new empty order.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    /// Returns the next victim without removing it.
    pub fn head(&self) -> Option<&K> {
        self.order.front()
    }

    /// Appends a key at the tail. Callers keep keys unique.
    fn push_back(&mut self, key: K) {
        self.order.push_back(key);
    }

    // == Remove ==
    /// Removes a key, returning whether it was tracked.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.order.iter().position(|k| k == key) {
            Some(index) => {
                self.order.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.order.iter().any(|k| k == key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    /// Iterates from next victim to most recent.
    pub fn iter(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }
}

impl<K: PartialEq> Default for EvictionOrder<K> {
    fn default() -> Self {
        Self::new()
    }
}

// == Eviction Strategy ==
/// Decides which key leaves a full cache and how accesses reorder the rest.
///
/// Strategies only ever reorder the [`EvictionOrder`]; removing a victim from
/// the map and the order is the engine's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionStrategy {
    /// First In First Out - insertion order, reads never reorder
    Fifo,
    /// Least Recently Used - every read or write moves the key to the tail
    #[default]
    Lru,
}

impl EvictionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionStrategy::Fifo => "FIFO",
            EvictionStrategy::Lru => "LRU",
        }
    }

    // == Select Victim ==
    /// Returns the key that should be evicted next, if any.
    pub fn select_victim<K: PartialEq + Clone>(&self, order: &EvictionOrder<K>) -> Option<K> {
        match self {
            EvictionStrategy::Fifo | EvictionStrategy::Lru => order.head().cloned(),
        }
    }

    // == Touch ==
    /// Records an access (read or write) of `key`.
    ///
    /// FIFO appends only keys it has not seen, so a re-put keeps its original
    /// position. LRU always moves the key to the tail.
    pub fn touch<K: PartialEq + Clone>(&self, key: &K, order: &mut EvictionOrder<K>) {
        match self {
            EvictionStrategy::Fifo => {
                if !order.contains(key) {
                    order.push_back(key.clone());
                }
            }
            EvictionStrategy::Lru => {
                order.remove(key);
                order.push_back(key.clone());
            }
        }
    }
}

impl fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionStrategy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "fifo" => Ok(EvictionStrategy::Fifo),
            "lru" => Ok(EvictionStrategy::Lru),
            _ => Err(CacheError::Config(format!(
                "unknown eviction strategy '{}'",
                s
            ))),
        }
    }
}

/// Lowercases a selector name and drops `-`, `_` and spaces.
pub(crate) fn normalize_name(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}
