//! Storage implementations.
//!
//! `sqlite` holds the relational store for every journal entity; `cached`
//! holds the generic repository that fronts it with the configured cache.

pub mod cached;
pub mod sqlite;

pub use cached::Repository;
pub use sqlite::{connect, SqliteStore};

/// Repository for entity `E` over the SQLite store.
pub type Repo<E> = Repository<E, SqliteStore<E>>;
