//! Policy Cache - A bounded in-process cache engine
//!
//! Sits in front of a slower data source with pluggable eviction (FIFO, LRU),
//! read (Simple, ReadThrough, RefreshAhead) and write (WriteAlways,
//! WriteBehind, WriteIfAbsent) policies, plus a small HTTP demo server.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod source;
mod tasks;

pub use api::AppState;
pub use cache::{CacheBuilder, CacheEngine};
pub use config::Config;
pub use error::{CacheError, DataSourceError};
pub use source::{DataSource, MemoryDataSource};
