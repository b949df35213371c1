//! Cache-aside repository.
//!
//! [`Repository`] wraps any [`Store`](helmsman_core::storage::Store) with an
//! optional cache layer:
//!
//! - **Reads**: check the cache, on miss fetch from the store (one fetch per
//!   key at a time) and populate the cache with the entity or a placeholder
//! - **Writes**: persist to the store, then invalidate the touched keys
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let pool = connect("helmsman.db").await?;
//! let store = Arc::new(SqliteStore::<Trade>::new(pool));
//! let cache = Arc::new(MemoryCache::new(10_000));
//!
//! let trades = Repository::with_cache(store, cache, Duration::from_secs(300));
//! ```

mod coalescer;
mod entity_cache;
mod repository;

pub use repository::Repository;
