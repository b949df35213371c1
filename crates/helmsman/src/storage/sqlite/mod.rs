//! SQLite storage backend implementation.
//!
//! One generic [`SqliteStore`] serves every journal entity. Each entity's
//! table name and row decoding come from its [`SqlEntity`] impl; its
//! writable columns come from the entity's column-mapping table.

mod conversions;
mod error;
mod schema;
mod store;

pub use conversions::SqlEntity;
pub use store::{connect, SqliteStore};
