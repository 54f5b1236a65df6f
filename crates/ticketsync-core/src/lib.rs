//! Client-side synchronization of subject and ticket state.
//!
//! `ticketsync-core` keeps an in-memory view of two read-only remote
//! collections, mirrors it into a local cache so it survives restarts, and
//! re-polls the remote on a fixed cadence. The current subject is resolved
//! from the view URL, falling back to the identifier remembered in the cache.
//!
//! The pieces, leaves first:
//! - [`cache`]: key-value persistence and the typed snapshot slots
//! - [`api`]: the remote fetcher and client-side lookup by id
//! - [`identity`]: subject resolution from URL and cache
//! - [`scheduler`]: the single replaceable poll timer
//! - [`store`]: the live state and its refresh operations
//! - [`engine`]: the runtime wiring everything together

pub mod api;
pub mod cache;
pub mod config;
pub mod engine;
pub mod identity;
pub mod models;
pub mod refresh;
pub mod scheduler;
pub mod store;

#[cfg(test)]
mod testing;

pub use api::{ApiError, RemoteFetcher, SheetClient};
pub use cache::{CacheKey, CacheStore, FileCacheStore, MemoryCacheStore, SnapshotCache};
pub use config::Config;
pub use engine::{EngineOptions, Navigator, SyncEngine, SyncHandle};
pub use identity::{IdentityResolver, IdentitySource, Resolution, ViewLocation};
pub use models::{Subject, Ticket};
pub use refresh::{RefreshOutcome, RefreshRequest};
pub use scheduler::PollScheduler;
pub use store::{StateStore, SyncSnapshot};
