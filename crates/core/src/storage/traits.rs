use async_trait::async_trait;

use crate::query::{Filter, Page};

use super::{Entity, Result, SqlValue};

/// Relational store for one entity type.
///
/// Implementations own row translation and SQL. Lookups return `Ok(None)`
/// when no row matches; updates and deletes of a missing row return
/// `RepositoryError::NotFound`.
#[async_trait]
pub trait Store<E: Entity>: Send + Sync + 'static {
    /// Unit-of-work handle shared by the transactional operations.
    type Tx: Send;

    /// Inserts an entity and returns its key.
    async fn insert(&self, entity: &E) -> Result<E::Key>;

    /// Gets an entity by its key.
    async fn find(&self, key: E::Key) -> Result<Option<E>>;

    /// Gets every entity whose key is in `keys`, in one round-trip.
    async fn find_many(&self, keys: &[E::Key]) -> Result<Vec<E>>;

    /// Gets the first entity (lowest key) matching a filter.
    async fn find_first(&self, filter: &Filter) -> Result<Option<E>>;

    /// Counts the entities matching a filter.
    async fn count(&self, filter: &Filter) -> Result<u64>;

    /// Gets one page of entities matching a filter.
    async fn find_page(&self, filter: &Filter, page: &Page) -> Result<Vec<E>>;

    /// Gets entities whose key is below `last_key`, or from the top when `None`.
    async fn find_before(&self, last_key: Option<E::Key>, page: &Page) -> Result<Vec<E>>;

    /// Applies a set of column changes to one entity.
    async fn update(&self, key: E::Key, changes: &[(&'static str, SqlValue)]) -> Result<()>;

    /// Deletes one entity.
    async fn delete(&self, key: E::Key) -> Result<()>;

    /// Deletes every entity whose key is in `keys`.
    async fn delete_many(&self, keys: &[E::Key]) -> Result<()>;

    /// Starts a transaction.
    async fn begin(&self) -> Result<Self::Tx>;

    /// Commits a transaction.
    async fn commit(&self, tx: Self::Tx) -> Result<()>;

    /// Rolls a transaction back.
    async fn rollback(&self, tx: Self::Tx) -> Result<()>;

    async fn insert_tx(&self, tx: &mut Self::Tx, entity: &E) -> Result<E::Key>;

    async fn update_tx(
        &self,
        tx: &mut Self::Tx,
        key: E::Key,
        changes: &[(&'static str, SqlValue)],
    ) -> Result<()>;

    async fn delete_tx(&self, tx: &mut Self::Tx, key: E::Key) -> Result<()>;
}
