//! Background Tasks Module
//!
//! Work the cache engine dispatches off the caller's path.
//!
//! # Tasks
//! - Write-behind worker: persists deferred stores in queue order
//! - Refresh-ahead: reloads a cached entry after a delay

mod refresh;
mod write_behind;

pub(crate) use refresh::spawn_refresh;
pub(crate) use write_behind::{spawn_write_behind_worker, WriteJob};
