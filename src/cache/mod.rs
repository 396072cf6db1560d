//! Cache Module
//!
//! Bounded in-process cache with pluggable eviction, read and write policies.

mod builder;
mod engine;
mod eviction;
mod read_policy;
mod stats;
mod write_policy;


// Re-export public types
pub use builder::CacheBuilder;
pub use engine::{CacheEngine, CacheKey, CacheValue};
pub use eviction::{EvictionOrder, EvictionStrategy};
pub use read_policy::{ReadOutcome, ReadPolicy, DEFAULT_REFRESH_INTERVAL};
pub use stats::CacheStats;
pub use write_policy::{WriteOutcome, WritePolicy};

pub(crate) use engine::Shared;
