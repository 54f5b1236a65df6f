//! Local persistence for the last known state.
//!
//! This module provides a raw key-value `CacheStore` and the typed
//! `SnapshotCache` the state store reads and writes through. Every slot holds
//! a JSON document; a slot that no longer decodes is evicted, never repaired.
//!
//! Cached slots:
//! - Resolved subject identifier
//! - Current subject and the full subject collection
//! - Current ticket and the full ticket collection

pub mod snapshot;
pub mod store;

pub use snapshot::{CacheKey, SnapshotCache};
pub use store::{CacheStore, FileCacheStore, MemoryCacheStore};
