use std::fmt;
use std::hash::Hash;

use serde::{de::DeserializeOwned, Serialize};

use super::SqlValue;

/// A primary key type.
pub trait EntityKey:
    Copy + Eq + Hash + Ord + fmt::Display + fmt::Debug + Send + Sync + 'static
{
    /// Returns true for the invalid default key.
    fn is_zero(&self) -> bool;

    /// Returns false for keys no stored row can carry.
    fn fits_store(&self) -> bool {
        true
    }

    /// Converts the key to a query parameter.
    fn to_value(&self) -> SqlValue;

    /// Converts a store-assigned row id back into a key.
    fn from_row_id(id: i64) -> Option<Self>;
}

impl EntityKey for u64 {
    fn is_zero(&self) -> bool {
        *self == 0
    }

    fn fits_store(&self) -> bool {
        i64::try_from(*self).is_ok()
    }

    /// Keys that fail [`EntityKey::fits_store`] saturate; callers reject
    /// them before they reach a query.
    fn to_value(&self) -> SqlValue {
        SqlValue::Int(i64::try_from(*self).unwrap_or(i64::MAX))
    }

    fn from_row_id(id: i64) -> Option<Self> {
        u64::try_from(id).ok()
    }
}

/// One row of an entity's column-mapping table.
///
/// Maps a JSON field name to a store column and knows how to read the
/// field's value out of an entity. Zero checks go through
/// [`SqlValue::is_zero`].
pub struct ColumnMapping<E> {
    /// Field name as it appears in JSON payloads.
    pub field: &'static str,
    /// Column name in the relational store.
    pub column: &'static str,
    read: fn(&E) -> SqlValue,
}

impl<E> ColumnMapping<E> {
    pub const fn new(field: &'static str, column: &'static str, read: fn(&E) -> SqlValue) -> Self {
        Self {
            field,
            column,
            read,
        }
    }

    /// Reads this column's value from an entity.
    pub fn value(&self, entity: &E) -> SqlValue {
        (self.read)(entity)
    }
}

impl<E> fmt::Debug for ColumnMapping<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnMapping")
            .field("field", &self.field)
            .field("column", &self.column)
            .finish()
    }
}

/// A record managed by the generic repository.
///
/// Implementors describe their key, their store table layout and their
/// writable columns. The `created_at`/`updated_at` timestamps are stamped by
/// the store and are never part of [`Entity::columns`].
pub trait Entity: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Key: EntityKey;

    /// Entity name, used for cache key prefixes, error messages and routes.
    const NAME: &'static str;

    /// Primary key column.
    const KEY_COLUMN: &'static str = "id";

    /// Whether the store assigns the key on insert.
    const GENERATED_KEY: bool = true;

    /// Writable columns, excluding the key and the timestamps.
    fn columns() -> &'static [ColumnMapping<Self>];

    /// Returns the entity's key.
    fn key(&self) -> Self::Key;

    /// Sets the entity's key.
    fn set_key(&mut self, key: Self::Key);
}
